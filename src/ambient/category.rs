//! Musical roles ambient loops are filed under.

use std::fmt;
use std::ops::{Index, IndexMut};

/// Classification of a loop by its role in the ambient bed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Category {
    Interesting,
    High,
    Mid,
    Low,
    Beat,
}

impl Category {
    pub const COUNT: usize = 5;

    /// Every category in declaration order.
    pub const ALL: [Category; Category::COUNT] = [
        Category::Interesting,
        Category::High,
        Category::Mid,
        Category::Low,
        Category::Beat,
    ];

    /// Directory name clips of this category are stored under.
    pub fn name(self) -> &'static str {
        match self {
            Self::Interesting => "Interesting",
            Self::High => "High",
            Self::Mid => "Mid",
            Self::Low => "Low",
            Self::Beat => "Beat",
        }
    }

    fn slot(self) -> usize {
        match self {
            Self::Interesting => 0,
            Self::High => 1,
            Self::Mid => 2,
            Self::Low => 3,
            Self::Beat => 4,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One value per [`Category`], indexed by the category itself.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryTable<T>([T; Category::COUNT]);

impl<T> CategoryTable<T> {
    pub const fn new(values: [T; Category::COUNT]) -> Self {
        Self(values)
    }

    pub fn from_fn(mut f: impl FnMut(Category) -> T) -> Self {
        Self(std::array::from_fn(|i| f(Category::ALL[i])))
    }

    pub fn iter(&self) -> impl Iterator<Item = (Category, &T)> {
        Category::ALL.into_iter().zip(self.0.iter())
    }

    pub fn values(&self) -> impl Iterator<Item = &T> {
        self.0.iter()
    }

    pub fn values_mut(&mut self) -> impl Iterator<Item = &mut T> {
        self.0.iter_mut()
    }
}

impl<T: Default> Default for CategoryTable<T> {
    fn default() -> Self {
        Self(std::array::from_fn(|_| T::default()))
    }
}

impl<T> Index<Category> for CategoryTable<T> {
    type Output = T;

    fn index(&self, category: Category) -> &T {
        &self.0[category.slot()]
    }
}

impl<T> IndexMut<Category> for CategoryTable<T> {
    fn index_mut(&mut self, category: Category) -> &mut T {
        &mut self.0[category.slot()]
    }
}
