//! The closed set of kernel variants and their lookup table.

use crate::{
    config::Dims,
    geometry::{GeometryPolicy, KernelDescriptor, TileShape},
};
use std::fmt;

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Variant {
    Naive,
    Coalesced,
    SmemCache,
    Tiling1d,
    Tiling2d,
    Tiling2dTransposed,
    WarpTile,
}

struct Entry {
    name: &'static str,
    alias: &'static str,
    entry_point: &'static str,
    policy: GeometryPolicy,
}

const fn tiled(bm: u32, bn: u32, bk: u32, tm: u32, tn: u32, cooperative: bool) -> GeometryPolicy {
    GeometryPolicy::Tiled {
        shape: TileShape { bm, bn, bk, tm, tn },
        cooperative,
    }
}

const NAIVE: GeometryPolicy = GeometryPolicy::Fixed {
    tile: 32,
    threads: 1024,
};

// Indexed by `Variant as usize`.
#[rustfmt::skip]
static REGISTRY: [Entry; 7] = [
    Entry { name: "naive",       alias: "v1", entry_point: "matmul_naive",       policy: NAIVE },
    Entry { name: "coalesced",   alias: "v2", entry_point: "matmul_coalesced",   policy: NAIVE },
    Entry { name: "smem-cache",  alias: "v3", entry_point: "matmul_smem_cache",  policy: tiled(32, 32, 32, 1, 1, true) },
    Entry { name: "tiling-1d",   alias: "v4", entry_point: "matmul_tiling_1d",   policy: tiled(64, 64, 8, 8, 1, true) },
    Entry { name: "tiling-2d",   alias: "v5", entry_point: "matmul_tiling_2d",   policy: tiled(64, 64, 4, 4, 4, true) },
    Entry { name: "tiling-2d-t", alias: "v6", entry_point: "matmul_tiling_2d_t", policy: tiled(32, 32, 8, 2, 2, true) },
    Entry { name: "warp-tile",   alias: "v7", entry_point: "matmul_warp_tile",   policy: tiled(8, 8, 1, 1, 2, false) },
];

/// Baseline kernel used as the correctness oracle. Not selectable.
pub const REFERENCE_NAME: &str = "reference";
pub const REFERENCE_ENTRY: &str = "matmul_reference";
const REFERENCE_POLICY: GeometryPolicy = GeometryPolicy::Fixed {
    tile: 16,
    threads: 256,
};

impl Variant {
    pub const ALL: [Self; 7] = [
        Self::Naive,
        Self::Coalesced,
        Self::SmemCache,
        Self::Tiling1d,
        Self::Tiling2d,
        Self::Tiling2dTransposed,
        Self::WarpTile,
    ];

    /// Resolves a variant by name, `v1`..`v7` alias or kernel entry point.
    pub fn lookup(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|v| {
            let e = v.entry();
            name == e.name || name == e.alias || name == e.entry_point
        })
    }

    #[inline]
    fn entry(self) -> &'static Entry {
        &REGISTRY[self as usize]
    }

    #[inline]
    pub fn name(self) -> &'static str {
        self.entry().name
    }

    #[inline]
    pub fn entry_point(self) -> &'static str {
        self.entry().entry_point
    }

    #[inline]
    pub fn plan(self, dims: Dims) -> KernelDescriptor {
        let e = self.entry();
        e.policy.plan(e.name, e.entry_point, dims)
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let e = self.entry();
        write!(f, "{:<12}{:<4}{}", e.name, e.alias, e.entry_point)
    }
}

pub fn reference_plan(dims: Dims) -> KernelDescriptor {
    REFERENCE_POLICY.plan(REFERENCE_NAME, REFERENCE_ENTRY, dims)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_table_matches_enum() {
        for (i, v) in Variant::ALL.into_iter().enumerate() {
            assert_eq!(v as usize, i);
            assert_eq!(Variant::lookup(v.name()), Some(v));
            assert_eq!(Variant::lookup(v.entry_point()), Some(v));
            assert_eq!(Variant::lookup(&format!("v{}", i + 1)), Some(v));
        }
    }

    #[test]
    fn test_unknown_name() {
        assert_eq!(Variant::lookup("v8"), None);
        assert_eq!(Variant::lookup(""), None);
        assert_eq!(Variant::lookup(REFERENCE_NAME), None);
        assert_eq!(Variant::lookup("NAIVE"), None);
    }

    #[test]
    fn test_registered_geometry_is_legal() {
        let dims = Dims::new(64, 32, 64).unwrap();
        for v in Variant::ALL {
            let desc = v.plan(dims);
            assert!(desc.covers(dims), "{v:?}");
            assert_eq!(desc.check(1024), Ok(()), "{v:?}");
        }
        let desc = reference_plan(dims);
        assert!(desc.covers(dims));
        assert_eq!(desc.check(1024), Ok(()));
    }

    #[test]
    fn test_unique_entry_points() {
        let mut names = REGISTRY
            .iter()
            .flat_map(|e| [e.name, e.alias, e.entry_point])
            .chain([REFERENCE_NAME, REFERENCE_ENTRY])
            .collect::<Vec<_>>();
        let len = names.len();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), len);
    }
}
