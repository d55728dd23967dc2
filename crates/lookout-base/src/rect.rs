use crate::Vec2;
use std::ops::{Add, Mul, Sub};

/// Axis-aligned rectangle given by its top-left `origin` and `size`.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Rect<T> {
    pub origin: Vec2<T>,
    pub size: Vec2<T>,
}

impl<T> Rect<T> {
    pub fn new(origin: Vec2<T>, size: Vec2<T>) -> Self {
        Self { origin, size }
    }
}

impl<T: Sub<Output = T> + Copy> Rect<T> {
    pub fn from_min_max(min: Vec2<T>, max: Vec2<T>) -> Self {
        Self {
            origin: min,
            size: max - min,
        }
    }
}

impl<T: Add<Output = T> + Copy> Rect<T> {
    pub fn min(&self) -> Vec2<T> {
        self.origin
    }

    pub fn max(&self) -> Vec2<T> {
        self.origin + self.size
    }
}

impl<T: Mul<Output = T> + Copy> Rect<T> {
    pub fn area(&self) -> T {
        self.size.x * self.size.y
    }
}

fn partial_max<T: PartialOrd>(a: T, b: T) -> T {
    if a > b { a } else { b }
}

fn partial_min<T: PartialOrd>(a: T, b: T) -> T {
    if a < b { a } else { b }
}

impl<T: Add<Output = T> + Sub<Output = T> + PartialOrd + Copy> Rect<T> {
    /// True when the interiors overlap; touching edges do not count.
    pub fn intersects(&self, other: &Rect<T>) -> bool {
        let (a_max, b_max) = (self.max(), other.max());
        self.origin.x < b_max.x
            && other.origin.x < a_max.x
            && self.origin.y < b_max.y
            && other.origin.y < a_max.y
    }

    pub fn intersection(&self, other: &Rect<T>) -> Option<Rect<T>> {
        if !self.intersects(other) {
            return None;
        }
        let (a_max, b_max) = (self.max(), other.max());
        let min = Vec2::new(
            partial_max(self.origin.x, other.origin.x),
            partial_max(self.origin.y, other.origin.y),
        );
        let max = Vec2::new(partial_min(a_max.x, b_max.x), partial_min(a_max.y, b_max.y));
        Some(Rect::from_min_max(min, max))
    }
}
