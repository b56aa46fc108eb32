//! Random record sets shaped like contract storage.
//!
//! Every field of every attribute of every contract either holds a value
//! directly or is a mapping nested up to [`MAX_NESTED_KEYS`] levels deep. The
//! depth is drawn per field from a weighted distribution; each mapping level
//! gets a random number of distinct keys.

use rand::{
    distr::{weighted::WeightedIndex, Distribution},
    seq::index::sample,
    Rng,
};
use tracing::info;

use crate::{
    record::{CompositeKey, Record, MAX_NESTED_KEYS},
    Error,
};

/// Shape of a generated record set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratorOptions {
    pub contracts: u64,
    pub attributes: u64,
    pub fields: u64,
    /// Exclusive upper bound of generated keys and values.
    pub max_number: u64,
    /// Smallest number of keys in one mapping level.
    pub min_mapping_size: usize,
    /// Exclusive upper bound of the number of keys in one mapping level.
    pub max_mapping_size: usize,
    /// Relative weight of each nesting depth, starting with depth 0 (a plain
    /// value).
    pub depth_weights: Vec<u32>,
}

impl Default for GeneratorOptions {
    fn default() -> Self {
        GeneratorOptions {
            contracts: 1,
            attributes: 1,
            fields: 10,
            max_number: 256,
            min_mapping_size: 1,
            max_mapping_size: 6,
            depth_weights: vec![8, 4, 2, 1],
        }
    }
}

/// Validated generator, reusable across runs.
#[derive(Debug, Clone)]
pub struct RecordGenerator {
    options: GeneratorOptions,
    key_space: usize,
    depths: WeightedIndex<u32>,
}

impl RecordGenerator {
    pub fn new(options: GeneratorOptions) -> Result<Self, Error> {
        if options.max_number == 0 {
            return Err(Error::InvalidOptions("max_number must be positive".to_owned()));
        }
        if options.min_mapping_size == 0 || options.min_mapping_size >= options.max_mapping_size {
            return Err(Error::InvalidOptions(format!(
                "mapping sizes must satisfy 0 < min < max, got {}..{}",
                options.min_mapping_size, options.max_mapping_size
            )));
        }
        let key_space = usize::try_from(options.max_number).map_err(|_| {
            Error::InvalidOptions(format!("max_number {} is too large", options.max_number))
        })?;
        if options.max_mapping_size - 1 > key_space {
            return Err(Error::InvalidOptions(format!(
                "a mapping of up to {} keys does not fit below {}",
                options.max_mapping_size - 1,
                options.max_number
            )));
        }
        if options.depth_weights.len() > MAX_NESTED_KEYS + 1 {
            return Err(Error::InvalidOptions(format!(
                "{} depth weights given, nesting stops at depth {}",
                options.depth_weights.len(),
                MAX_NESTED_KEYS
            )));
        }
        let depths = WeightedIndex::new(&options.depth_weights)
            .map_err(|e| Error::InvalidOptions(format!("depth weights: {e}")))?;

        Ok(RecordGenerator {
            options,
            key_space,
            depths,
        })
    }

    pub fn options(&self) -> &GeneratorOptions {
        &self.options
    }

    /// Generates a record set sorted by composite key.
    pub fn generate<R>(&self, rng: &mut R) -> Vec<Record>
    where
        R: Rng + ?Sized,
    {
        let mut records = Vec::new();
        for contract in 0..self.options.contracts {
            for attribute in 0..self.options.attributes {
                for field in 0..self.options.fields {
                    let depth = self.depths.sample(rng);
                    self.fill(&mut vec![contract, attribute, field], depth, rng, &mut records);
                }
            }
        }
        info!(
            records = records.len(),
            fields = self.options.contracts * self.options.attributes * self.options.fields,
            "generated records"
        );
        records
    }

    /// Emits the records below `prefix`, `depth` mapping levels deep.
    fn fill<R>(&self, prefix: &mut Vec<u64>, depth: usize, rng: &mut R, out: &mut Vec<Record>)
    where
        R: Rng + ?Sized,
    {
        if depth == 0 {
            let value = rng.random_range(0..self.options.max_number);
            out.push(Record::new(CompositeKey::from_prefix(prefix), value));
            return;
        }

        let size = rng.random_range(self.options.min_mapping_size..self.options.max_mapping_size);
        let mut keys = sample(rng, self.key_space, size).into_vec();
        keys.sort_unstable();
        for key in keys {
            prefix.push(key as u64);
            self.fill(prefix, depth - 1, rng, out);
            prefix.pop();
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use assert_matches::assert_matches;
    use rand::{rngs::StdRng, SeedableRng};

    use super::*;
    use crate::{grouper::group_records, record::FIXED_KEY_COMPONENTS};

    #[test]
    fn default_shape() {
        let generator = RecordGenerator::new(GeneratorOptions::default()).unwrap();
        let records = generator.generate(&mut StdRng::seed_from_u64(5));

        let fields: HashSet<u64> = records.iter().map(|r| r.key.components()[2]).collect();
        assert_eq!(fields, (0..10).collect::<HashSet<u64>>());
        for record in &records {
            let key = record.key.components();
            assert_eq!(&key[..2], &[0, 0]);
            assert!(key.len() >= FIXED_KEY_COMPONENTS);
            assert!(key.len() <= FIXED_KEY_COMPONENTS + MAX_NESTED_KEYS);
            assert!(key.iter().all(|k| *k < 256));
            assert!(record.value < 256);
        }
    }

    #[test]
    fn output_is_sorted_unique_and_groupable() {
        let options = GeneratorOptions {
            contracts: 2,
            attributes: 3,
            fields: 20,
            ..Default::default()
        };
        let generator = RecordGenerator::new(options).unwrap();
        for seed in 0..20 {
            let records = generator.generate(&mut StdRng::seed_from_u64(seed));
            assert!(records.windows(2).all(|w| w[0].key < w[1].key), "seed {seed}");
            let forest = group_records(&records).unwrap();
            assert_eq!(forest.len(), 2);
        }
    }

    #[test]
    fn depth_follows_the_weights() {
        let options = GeneratorOptions {
            fields: 5,
            depth_weights: vec![0, 0, 1],
            ..Default::default()
        };
        let records = RecordGenerator::new(options)
            .unwrap()
            .generate(&mut StdRng::seed_from_u64(11));
        assert!(records.iter().all(|r| r.key.len() == FIXED_KEY_COMPONENTS + 2));
    }

    #[test]
    fn seeded_runs_repeat() {
        let generator = RecordGenerator::new(GeneratorOptions::default()).unwrap();
        let first = generator.generate(&mut StdRng::seed_from_u64(99));
        let second = generator.generate(&mut StdRng::seed_from_u64(99));
        assert_eq!(first, second);
    }

    #[test]
    fn invalid_options_are_rejected() {
        let invalid = [
            GeneratorOptions {
                max_number: 0,
                ..Default::default()
            },
            GeneratorOptions {
                min_mapping_size: 3,
                max_mapping_size: 3,
                ..Default::default()
            },
            GeneratorOptions {
                max_number: 3,
                ..Default::default()
            },
            GeneratorOptions {
                depth_weights: vec![1; MAX_NESTED_KEYS + 2],
                ..Default::default()
            },
            GeneratorOptions {
                depth_weights: vec![0, 0],
                ..Default::default()
            },
            GeneratorOptions {
                depth_weights: vec![],
                ..Default::default()
            },
        ];
        for options in invalid {
            assert_matches!(RecordGenerator::new(options), Err(Error::InvalidOptions(_)));
        }
    }
}
