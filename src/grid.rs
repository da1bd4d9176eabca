use std::ops::{Index, IndexMut};

use crate::coord::Coord;

/// Eight rows of eight slots addressed by [`Coord`], row 0 first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Grid<T>(pub [[T; 8]; 8]);

impl<T> Grid<T> {
    pub fn row(&self, y: u8) -> &[T; 8] {
        &self.0[y as usize]
    }
    pub fn row_mut(&mut self, y: u8) -> &mut [T; 8] {
        &mut self.0[y as usize]
    }
    pub fn positioned(&self) -> impl Iterator<Item = (Coord, &T)> {
        (0..).zip(&self.0).flat_map(|(y, row)| {
            (0..)
                .zip(row)
                .map(move |(x, item)| (Coord::new(x, y), item))
        })
    }
}
impl<T> Grid<Option<T>>
where
    T: Copy,
{
    /// Occupied slots only, with their position.
    pub fn occupied(&self) -> impl Iterator<Item = (Coord, T)> {
        self.positioned()
            .filter_map(|(position, slot)| slot.map(|item| (position, item)))
    }
}
impl<T> Index<Coord> for Grid<T> {
    type Output = T;

    fn index(&self, index: Coord) -> &Self::Output {
        &self.row(index.y())[index.x() as usize]
    }
}
impl<T> IndexMut<Coord> for Grid<T> {
    fn index_mut(&mut self, index: Coord) -> &mut Self::Output {
        &mut self.row_mut(index.y())[index.x() as usize]
    }
}
