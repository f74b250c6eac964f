//! Launch geometry planning and legality checks.

use crate::{config::Dims, error::DispatchError};

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Dim3 {
    pub x: u32,
    pub y: u32,
    pub z: u32,
}

impl Dim3 {
    #[inline]
    pub const fn new(x: u32, y: u32, z: u32) -> Self {
        Self { x, y, z }
    }

    #[inline]
    pub const fn volume(&self) -> u32 {
        self.x * self.y * self.z
    }
}

/// Block tile `BM×BN` walked along K in steps of `BK`; every thread owns a `TM×TN` patch of C.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct TileShape {
    pub bm: u32,
    pub bn: u32,
    pub bk: u32,
    pub tm: u32,
    pub tn: u32,
}

impl TileShape {
    #[inline]
    pub const fn threads(&self) -> u32 {
        (self.bn * self.bm) / (self.tm * self.tn)
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum GeometryPolicy {
    /// One output element per thread, `tile × tile` outputs per block.
    Fixed { tile: u32, threads: u32 },
    /// Register tiling. `cooperative` kernels stage one element of the A and
    /// B tiles per thread in shared memory before computing.
    Tiled { shape: TileShape, cooperative: bool },
}

impl GeometryPolicy {
    /// Output rows and columns covered by one block.
    #[inline]
    pub const fn footprint(&self) -> (u32, u32) {
        match *self {
            Self::Fixed { tile, .. } => (tile, tile),
            Self::Tiled { shape, .. } => (shape.bm, shape.bn),
        }
    }

    pub fn plan(self, name: &'static str, entry_point: &'static str, dims: Dims) -> KernelDescriptor {
        let (tile_m, tile_n) = self.footprint();
        let grid = Dim3::new(dims.n.div_ceil(tile_n), dims.m.div_ceil(tile_m), 1);
        let block = match self {
            Self::Fixed { threads, .. } => Dim3::new(threads, 1, 1),
            Self::Tiled { shape, .. } => Dim3::new(shape.threads(), 1, 1),
        };
        KernelDescriptor {
            name,
            entry_point,
            policy: self,
            grid,
            block,
        }
    }
}

/// Everything needed to launch one kernel once.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct KernelDescriptor {
    pub name: &'static str,
    pub entry_point: &'static str,
    pub policy: GeometryPolicy,
    pub grid: Dim3,
    pub block: Dim3,
}

impl KernelDescriptor {
    /// Must pass before any work is submitted with this descriptor.
    pub fn check(&self, max_threads_per_block: u32) -> Result<(), DispatchError> {
        let block = self.block.volume();
        if block > max_threads_per_block {
            return Err(DispatchError::BlockTooLarge {
                kernel: self.name,
                block,
                max: max_threads_per_block,
            });
        }
        if let GeometryPolicy::Tiled {
            shape,
            cooperative: true,
        } = self.policy
        {
            // Each thread loads exactly one element of each tile per K step,
            // so any other block size leaves part of the cache stale.
            let a_tile = shape.bm * shape.bk;
            let b_tile = shape.bn * shape.bk;
            if block != a_tile || block != b_tile {
                return Err(DispatchError::CooperativeLoadMismatch {
                    kernel: self.name,
                    block,
                    a_tile,
                    b_tile,
                });
            }
        }
        Ok(())
    }

    /// Whether the grid reaches every row and column of C.
    pub fn covers(&self, dims: Dims) -> bool {
        let (tile_m, tile_n) = self.policy.footprint();
        self.grid.x * tile_n >= dims.n && self.grid.y * tile_m >= dims.m
    }
}
