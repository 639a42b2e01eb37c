//! Aggregation keyed by a LONG group column.
//!
//! [`LongBlockHash`] turns key blocks into dense group ids; a
//! [`GroupingAggregatorFunction`] keeps one state per group id.

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};
use strata_common::{ElementType, Error, Result, Value};

use crate::data::{Block, BlockBuilder, Element, IntBlock, LongBlock, TypedBlock};
use crate::warnings::Warnings;

use super::function::AggregatorFunctionFactory;
use super::state::AggregatorState;

/// Assigns a dense group id to every distinct key, in first-seen order.
///
/// A null key is a group of its own. A multi-valued key puts its row in
/// the group of each distinct value.
#[derive(Debug, Default)]
pub struct LongBlockHash {
    ids: HashMap<i64, i32>,
    null_id: Option<i32>,
    keys: Vec<Option<i64>>,
}

impl LongBlockHash {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn group_count(&self) -> usize {
        self.keys.len()
    }

    pub fn key(&self, group: usize) -> Option<i64> {
        self.keys.get(group).copied().flatten()
    }

    /// Group id of `key`, creating the group on first sight
    pub fn id_for(&mut self, key: Option<i64>) -> i32 {
        let next = self.keys.len() as i32;
        let id = match key {
            Some(key) => *self.ids.entry(key).or_insert(next),
            None => *self.null_id.get_or_insert(next),
        };
        if id == next {
            self.keys.push(key);
        }
        id
    }

    /// Group ids for every position of `keys`
    pub fn add(&mut self, keys: &Block) -> Result<IntBlock> {
        let mut builder = IntBlock::builder(keys.position_count());
        match keys {
            Block::Null(nulls) => {
                for _ in 0..nulls.position_count() {
                    builder.append_value(self.id_for(None));
                }
            }
            Block::Long(block) => self.add_positions(block, &mut builder, |v| *v),
            Block::Int(block) => self.add_positions(block, &mut builder, |v| *v as i64),
            other => {
                return Err(Error::ElementTypeMismatch {
                    expected: ElementType::Long,
                    actual: other.element_type(),
                })
            }
        }
        Ok(builder.build())
    }

    fn add_positions<T: Element>(
        &mut self,
        block: &TypedBlock<T>,
        builder: &mut BlockBuilder<i32>,
        key_of: impl Fn(&T) -> i64,
    ) {
        for position in 0..block.position_count() {
            match block.value_count(position) {
                0 => {
                    builder.append_value(self.id_for(None));
                }
                1 => {
                    let key = key_of(block.get(block.first_value_index(position)));
                    builder.append_value(self.id_for(Some(key)));
                }
                _ => {
                    let mut seen: Vec<i32> = Vec::new();
                    for value in block.position_values(position) {
                        let id = self.id_for(Some(key_of(value)));
                        if !seen.contains(&id) {
                            seen.push(id);
                        }
                    }
                    builder.append_values(seen);
                }
            }
        }
    }

    /// Keys in group id order, null for the null group
    pub fn keys_block(&self) -> LongBlock {
        let mut builder = LongBlock::builder(self.keys.len());
        for key in &self.keys {
            match key {
                Some(key) => builder.append_value(*key),
                None => builder.append_null(),
            };
        }
        builder.build()
    }

    pub fn keys(&self) -> &[Option<i64>] {
        &self.keys
    }
}

/// One aggregate state per group
#[derive(Debug, Clone)]
pub struct GroupingAggregatorFunction {
    empty: AggregatorState,
    states: Vec<AggregatorState>,
    warnings: Option<Warnings>,
}

impl GroupingAggregatorFunction {
    pub fn new(factory: &AggregatorFunctionFactory, warnings: Option<Warnings>) -> Self {
        GroupingAggregatorFunction {
            empty: factory.empty_state(),
            states: Vec::new(),
            warnings,
        }
    }

    fn state_mut(&mut self, group: usize) -> &mut AggregatorState {
        if group >= self.states.len() {
            self.states.resize(group + 1, self.empty.clone());
        }
        &mut self.states[group]
    }

    /// Add position `p` of `block` to every group listed at position `p` of
    /// `group_ids`
    pub fn add_raw_input(&mut self, group_ids: &IntBlock, block: &Block) -> Result<()> {
        if group_ids.position_count() != block.position_count() {
            return Err(Error::PositionCountMismatch {
                expected: group_ids.position_count(),
                actual: block.position_count(),
            });
        }
        for position in 0..block.position_count() {
            let start = group_ids.first_value_index(position);
            for index in start..start + group_ids.value_count(position) {
                let group = group_ids.get_int(index) as usize;
                self.state_mut(group).add_position(block, position)?;
            }
        }
        Ok(())
    }

    pub fn add_intermediate_input(&mut self, group: usize, state: &AggregatorState) -> Result<()> {
        self.state_mut(group).merge(state)
    }

    /// States of the first `group_count` groups; groups that saw no input
    /// get an empty state
    pub fn evaluate_intermediate(&self, group_count: usize) -> Vec<AggregatorState> {
        (0..group_count)
            .map(|g| self.states.get(g).cloned().unwrap_or_else(|| self.empty.clone()))
            .collect()
    }

    /// One position per group
    pub fn evaluate_final(&self, group_count: usize) -> Result<Block> {
        let values: Vec<Value> = self
            .evaluate_intermediate(group_count)
            .iter()
            .map(|state| state.finish(self.warnings.as_ref()))
            .collect();
        Block::from_values(self.empty.result_element_type(), &values)
    }

    pub fn describe(&self) -> String {
        self.empty.describe()
    }
}

/// Partial result of a grouped aggregation: the keys in group order and,
/// per aggregate, one state per group
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupedState {
    pub keys: Vec<Option<i64>>,
    pub states: Vec<Vec<AggregatorState>>,
}

impl GroupedState {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}
