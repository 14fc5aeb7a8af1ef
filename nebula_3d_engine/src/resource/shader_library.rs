/// Compiled program variants.
///
/// A program variant is one compiled `(shader, pass, keyword set)`
/// combination. Variants live in a SlotMap so their `ProgramId` stays
/// stable while other variants come and go. Recompiling a variant keeps its
/// id but bumps its generation, which tells the uniform cache that binding
/// slots may have moved.

use rustc_hash::FxHashMap;
use slotmap::{new_key_type, SlotMap};
use crate::engine_debug;
use crate::resource::shader::ShaderId;

new_key_type! {
    /// Stable identity of a compiled program variant
    pub struct ProgramId;
}

// ===== KEYWORD SET =====

/// Sorted, de-duplicated set of shader keywords
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct KeywordSet(Vec<String>);

impl KeywordSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a keyword. Returns false if it was already present
    pub fn insert(&mut self, keyword: impl Into<String>) -> bool {
        let keyword = keyword.into();
        match self.0.binary_search(&keyword) {
            Ok(_) => false,
            Err(pos) => {
                self.0.insert(pos, keyword);
                true
            }
        }
    }

    /// Remove a keyword. Returns false if it was absent
    pub fn remove(&mut self, keyword: &str) -> bool {
        match self.0.binary_search_by(|k| k.as_str().cmp(keyword)) {
            Ok(pos) => {
                self.0.remove(pos);
                true
            }
            Err(_) => false,
        }
    }

    pub fn contains(&self, keyword: &str) -> bool {
        self.0.binary_search_by(|k| k.as_str().cmp(keyword)).is_ok()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for KeywordSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut set = KeywordSet::new();
        for keyword in iter {
            set.insert(keyword);
        }
        set
    }
}

// ===== PROGRAM VARIANT =====

/// A resolved program: identity plus compile generation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ProgramVariant {
    pub id: ProgramId,
    pub generation: u32,
}

/// Lookup of compiled variants, implemented by whatever owns compilation
pub trait ProgramResolver {
    /// Compiled variant for a shader pass under a keyword set, if any
    fn resolve(&self, shader: ShaderId, pass_index: usize, keywords: &KeywordSet) -> Option<ProgramVariant>;
}

// ===== SHADER LIBRARY =====

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct VariantKey {
    shader: ShaderId,
    pass_index: usize,
    keywords: KeywordSet,
}

#[derive(Debug)]
struct CompiledVariant {
    key: VariantKey,
    generation: u32,
}

/// Registry of compiled program variants
#[derive(Debug, Default)]
pub struct ShaderLibrary {
    variants: SlotMap<ProgramId, CompiledVariant>,
    lookup: FxHashMap<VariantKey, ProgramId>,
}

impl ShaderLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a compiled variant, or return the existing one
    pub fn register(&mut self, shader: ShaderId, pass_index: usize, keywords: KeywordSet) -> ProgramVariant {
        let key = VariantKey { shader, pass_index, keywords };
        if let Some(&id) = self.lookup.get(&key) {
            let generation = self.variants[id].generation;
            return ProgramVariant { id, generation };
        }

        let id = self.variants.insert(CompiledVariant { key: key.clone(), generation: 0 });
        self.lookup.insert(key, id);
        ProgramVariant { id, generation: 0 }
    }

    /// Mark a variant as recompiled. Returns the new variant, or None if unknown
    pub fn recompile(&mut self, id: ProgramId) -> Option<ProgramVariant> {
        let variant = self.variants.get_mut(id)?;
        variant.generation = variant.generation.wrapping_add(1);
        engine_debug!("nebula3d::ShaderLibrary",
            "Program {:?} recompiled (generation {})", id, variant.generation);
        Some(ProgramVariant { id, generation: variant.generation })
    }

    /// Remove a variant. Returns false if unknown
    pub fn remove(&mut self, id: ProgramId) -> bool {
        match self.variants.remove(id) {
            Some(variant) => {
                self.lookup.remove(&variant.key);
                true
            }
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.variants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variants.is_empty()
    }
}

impl ProgramResolver for ShaderLibrary {
    fn resolve(&self, shader: ShaderId, pass_index: usize, keywords: &KeywordSet) -> Option<ProgramVariant> {
        let key = VariantKey { shader, pass_index, keywords: keywords.clone() };
        let id = *self.lookup.get(&key)?;
        let generation = self.variants.get(id)?.generation;
        Some(ProgramVariant { id, generation })
    }
}

#[cfg(test)]
#[path = "shader_library_tests.rs"]
mod tests;
