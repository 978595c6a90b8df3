//! Fixed-size storage for the word buffers.
//!
//! Every table in this crate is a flat run of `u64` words whose length is
//! known exactly at construction and never changes. [`FixedWords`] owns such
//! a run. With the `huge-pages` feature on Linux the buffer is requested as
//! a 2 MiB-huge-page anonymous mapping first, which keeps the rank tables of
//! multi-gigabit vectors out of TLB-miss territory; when the kernel refuses
//! (no reserved huge pages, overcommit limits) the allocation transparently
//! falls back to the ordinary heap. The release path mirrors whichever
//! acquisition succeeded.

use std::collections::TryReserveError;
use std::ops::{Deref, DerefMut};

use thiserror::Error;

/// Log2 of the 2 MiB huge-page size.
#[cfg(all(feature = "huge-pages", target_os = "linux"))]
const HUGE_PAGE_BITS: u8 = 21;

/// The 2 MiB huge-page size in bytes.
#[cfg(all(feature = "huge-pages", target_os = "linux"))]
const HUGE_PAGE_SIZE: usize = 1 << HUGE_PAGE_BITS;

/// Error raised when a word buffer cannot be allocated.
///
/// The huge-page path never produces this; only the ordinary heap fallback
/// failing does. It is propagated, never retried.
#[derive(Debug, Error)]
pub enum AllocError {
    #[error("failed to allocate a buffer of {words} words")]
    Exhausted {
        words: usize,
        source: TryReserveError,
    },
}

/// A heap buffer of `u64` words whose length is fixed at construction.
///
/// Dereferences to `[u64]`. There is no resize; the word count is part of
/// the structure's layout contract.
#[derive(Debug)]
pub struct FixedWords {
    backing: Backing,
}

#[derive(Debug)]
enum Backing {
    Heap(Box<[u64]>),
    #[cfg(all(feature = "huge-pages", target_os = "linux"))]
    Huge { map: memmap2::MmapMut, len: usize },
}

impl FixedWords {
    /// Allocates a zero-filled buffer of `len` words.
    pub fn new(len: usize) -> Result<Self, AllocError> {
        #[cfg(all(feature = "huge-pages", target_os = "linux"))]
        if len > 0 {
            // The kernel insists on a length that is a multiple of the huge
            // page size.
            let num_bytes = (len * 8).div_ceil(HUGE_PAGE_SIZE) * HUGE_PAGE_SIZE;
            match memmap2::MmapOptions::new()
                .len(num_bytes)
                .huge(Some(HUGE_PAGE_BITS))
                .map_anon()
            {
                Ok(map) => {
                    return Ok(Self {
                        backing: Backing::Huge { map, len },
                    });
                }
                Err(err) => {
                    tracing::debug!(len, %err, "huge-page mapping refused, using the heap");
                }
            }
        }

        let mut words = Vec::new();
        words
            .try_reserve_exact(len)
            .map_err(|source| AllocError::Exhausted { words: len, source })?;
        words.resize(len, 0);

        Ok(Self {
            backing: Backing::Heap(words.into_boxed_slice()),
        })
    }

    /// Number of words in the buffer.
    #[inline]
    pub fn len(&self) -> usize {
        match &self.backing {
            Backing::Heap(words) => words.len(),
            #[cfg(all(feature = "huge-pages", target_os = "linux"))]
            Backing::Huge { len, .. } => *len,
        }
    }

    /// Returns true if the buffer holds no words.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Deref for FixedWords {
    type Target = [u64];

    #[inline]
    fn deref(&self) -> &[u64] {
        match &self.backing {
            Backing::Heap(words) => words,
            #[cfg(all(feature = "huge-pages", target_os = "linux"))]
            // Anonymous mappings are page-aligned, so the word view is sound.
            Backing::Huge { map, len } => &bytemuck::cast_slice(map.as_ref())[..*len],
        }
    }
}

impl DerefMut for FixedWords {
    #[inline]
    fn deref_mut(&mut self) -> &mut [u64] {
        match &mut self.backing {
            Backing::Heap(words) => words,
            #[cfg(all(feature = "huge-pages", target_os = "linux"))]
            Backing::Huge { map, len } => &mut bytemuck::cast_slice_mut(map.as_mut())[..*len],
        }
    }
}
