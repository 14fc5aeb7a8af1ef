/// Write-through uniform cache.
///
/// Remembers, per compiled program variant, the last value written to each
/// named uniform. A write that would upload identical bits is skipped.
///
/// Entries are keyed by `ProgramId` and stamped with the variant generation
/// they were recorded under. When a program is recompiled its generation
/// changes, the stale entry is dropped, and the next write goes through.

use rustc_hash::FxHashMap;
use crate::error::Result;
use crate::device::CommandList;
use crate::resource::{ProgramId, ProgramVariant};
use crate::uniform::UniformValue;

/// Cache counters, reset with `reset_stats`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UniformCacheStats {
    /// Writes forwarded to the command list
    pub writes: u64,
    /// Writes skipped because the cached value was identical
    pub skipped: u64,
}

#[derive(Debug, Default)]
struct ProgramEntry {
    generation: u32,
    values: FxHashMap<String, UniformValue>,
}

/// Per-program cache of last-written uniform values
#[derive(Debug, Default)]
pub struct UniformCache {
    programs: FxHashMap<ProgramId, ProgramEntry>,
    stats: UniformCacheStats,
}

impl UniformCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Write `value` to `name` on `program` unless the cache already holds it
    ///
    /// Returns whether a GPU write was issued. The cache is only updated
    /// after the command list accepted the write, so a failed upload never
    /// leaves the cache claiming a value the GPU does not have.
    pub fn set_if_changed(
        &mut self,
        cmd: &mut dyn CommandList,
        program: ProgramVariant,
        name: &str,
        value: UniformValue,
    ) -> Result<bool> {
        let entry = self.programs.entry(program.id).or_insert_with(|| ProgramEntry {
            generation: program.generation,
            values: FxHashMap::default(),
        });

        if entry.generation != program.generation {
            entry.generation = program.generation;
            entry.values.clear();
        }

        if entry.values.get(name) == Some(&value) {
            self.stats.skipped += 1;
            return Ok(false);
        }

        cmd.set_uniform(program.id, name, &value)?;
        entry.values.insert(name.to_string(), value);
        self.stats.writes += 1;
        Ok(true)
    }

    /// Last value written to `name` on `program`, if still valid
    pub fn cached(&self, program: ProgramVariant, name: &str) -> Option<&UniformValue> {
        self.programs
            .get(&program.id)
            .filter(|entry| entry.generation == program.generation)
            .and_then(|entry| entry.values.get(name))
    }

    /// Forget everything cached for one program
    pub fn invalidate_program(&mut self, program: ProgramId) {
        self.programs.remove(&program);
    }

    /// Forget every cached value
    pub fn clear(&mut self) {
        self.programs.clear();
    }

    pub fn stats(&self) -> UniformCacheStats {
        self.stats
    }

    pub fn reset_stats(&mut self) {
        self.stats = UniformCacheStats::default();
    }

    /// Number of programs with cached values
    pub fn program_count(&self) -> usize {
        self.programs.len()
    }
}

#[cfg(test)]
#[path = "cache_tests.rs"]
mod tests;
