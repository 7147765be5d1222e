//! Decision variables.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Handle to a decision variable inside a [`VarPool`].
///
/// Ids are dense and ordered by declaration, so iterating a pool or sorting
/// ids always yields the same order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct VarId(pub(crate) u32);

impl VarId {
    /// Position of this variable in its pool.
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Sort of a decision variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Sort {
    /// Unbounded mathematical integer.
    Int,
    /// Boolean literal.
    Bool,
}

/// Declaration of one variable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VarDecl {
    /// Unique name (used in dumps and SMT-LIB export).
    pub name: String,
    /// Variable sort.
    pub sort: Sort,
    /// Explicit search range. `None` for integer variables means "a time
    /// variable", bounded by the problem's time bound at compile time.
    pub range: Option<(i64, i64)>,
    /// The range is a search hint that the other assertions already imply.
    /// Engines over unbounded integers do not assert it.
    #[serde(default)]
    pub implied: bool,
}

/// Registry of decision variables with unique names.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VarPool {
    decls: Vec<VarDecl>,
    #[serde(skip)]
    names: HashMap<String, VarId>,
}

impl VarPool {
    /// Creates an empty pool.
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares a time variable (integer ranged over `[0, time_bound]`).
    pub fn time(&mut self, name: impl Into<String>) -> VarId {
        self.declare(name.into(), Sort::Int, None)
    }

    /// Declares an integer variable with an explicit search range.
    pub fn int(&mut self, name: impl Into<String>, lo: i64, hi: i64) -> VarId {
        self.declare(name.into(), Sort::Int, Some((lo.min(hi), lo.max(hi))))
    }

    /// Declares an integer variable whose range only guides bounded
    /// search (an auxiliary defined by equalities, for instance).
    pub fn derived(&mut self, name: impl Into<String>, lo: i64, hi: i64) -> VarId {
        let id = self.int(name, lo, hi);
        self.decls[id.index()].implied = true;
        id
    }

    /// Declares a boolean variable.
    pub fn boolean(&mut self, name: impl Into<String>) -> VarId {
        self.declare(name.into(), Sort::Bool, Some((0, 1)))
    }

    fn declare(&mut self, name: String, sort: Sort, range: Option<(i64, i64)>) -> VarId {
        let name = self.fresh_name(name);
        let id = VarId(self.decls.len() as u32);
        self.names.insert(name.clone(), id);
        self.decls.push(VarDecl {
            name,
            sort,
            range,
            implied: false,
        });
        id
    }

    // Names collide when two entities share a prefix; suffix the later one.
    fn fresh_name(&self, base: String) -> String {
        if !self.names.contains_key(&base) {
            return base;
        }
        let mut n = 1;
        loop {
            let candidate = format!("{base}_{n}");
            if !self.names.contains_key(&candidate) {
                return candidate;
            }
            n += 1;
        }
    }

    /// Declaration of a variable.
    ///
    /// # Panics
    /// If `id` was not produced by this pool.
    pub fn get(&self, id: VarId) -> &VarDecl {
        &self.decls[id.index()]
    }

    /// Name of a variable.
    pub fn name(&self, id: VarId) -> &str {
        &self.get(id).name
    }

    /// Looks a variable up by name.
    pub fn find(&self, name: &str) -> Option<VarId> {
        self.names.get(name).copied().or_else(|| {
            // after deserialization the name index is empty
            self.decls
                .iter()
                .position(|d| d.name == name)
                .map(|i| VarId(i as u32))
        })
    }

    /// Iterates `(id, declaration)` in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (VarId, &VarDecl)> {
        self.decls
            .iter()
            .enumerate()
            .map(|(i, d)| (VarId(i as u32), d))
    }

    /// Integer variables with a range the model must respect.
    pub fn hard_ranges(&self) -> impl Iterator<Item = (VarId, (i64, i64))> + '_ {
        self.iter().filter_map(|(id, d)| match (d.sort, d.range) {
            (Sort::Int, Some(range)) if !d.implied => Some((id, range)),
            _ => None,
        })
    }

    /// Number of declared variables.
    pub fn len(&self) -> usize {
        self.decls.len()
    }

    /// Whether the pool is empty.
    pub fn is_empty(&self) -> bool {
        self.decls.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_declaration_order() {
        let mut pool = VarPool::new();
        let a = pool.time("a");
        let b = pool.boolean("b");
        let c = pool.int("c", 5, -5);

        assert_eq!(a.index(), 0);
        assert_eq!(b.index(), 1);
        assert_eq!(pool.get(b).sort, Sort::Bool);
        assert_eq!(pool.get(c).range, Some((-5, 5)));
        assert_eq!(pool.get(a).range, None);
        assert_eq!(pool.len(), 3);
    }

    #[test]
    fn test_hard_ranges_skip_hints() {
        let mut pool = VarPool::new();
        pool.time("t");
        pool.boolean("b");
        let x = pool.int("x", 900, 1000);
        let aux = pool.derived("aux", 0, 50);

        assert!(pool.get(aux).implied);
        assert_eq!(pool.get(aux).range, Some((0, 50)));
        assert_eq!(pool.hard_ranges().collect::<Vec<_>>(), vec![(x, (900, 1000))]);
    }

    #[test]
    fn test_fresh_names() {
        let mut pool = VarPool::new();
        let x = pool.time("x");
        let y = pool.time("x");
        let z = pool.time("x");

        assert_eq!(pool.name(x), "x");
        assert_eq!(pool.name(y), "x_1");
        assert_eq!(pool.name(z), "x_2");
        assert_eq!(pool.find("x_1"), Some(y));
        assert_eq!(pool.find("missing"), None);
    }
}
