use crate::Error;
use serde::{Deserialize, Serialize};
use std::{
    collections::{BTreeSet, HashMap},
    fs::File,
    path::{Path, PathBuf},
};

/// The `model.safetensors.index.json` of a sharded checkpoint.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct IndexFile {
    #[serde(default)]
    metadata: HashMap<String, serde_json::Value>,

    /// tensor name -> shard file name
    weight_map: HashMap<String, String>,
}

impl IndexFile {
    pub fn from_path<P>(value: P) -> Result<Self, Error>
    where
        P: AsRef<Path>,
    {
        let mut file = File::open(value)?;

        Ok(serde_json::from_reader(&mut file)?)
    }

    /// Returns the number of tensors listed in the index
    pub fn num_tensors(&self) -> usize {
        self.weight_map.len()
    }

    /// Returns the list of all model dependent sharded safetensor files
    ///
    /// Every shard appears once, ordered by file name.
    pub fn files<P>(&self, dir: P) -> Vec<PathBuf>
    where
        P: AsRef<Path>,
    {
        let dir = dir.as_ref();

        self.weight_map
            .values()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .map(|shard| dir.join(shard))
            .collect()
    }
}
