//! Gas accounting
//!
//! Queries pay a fixed base charge derived from the input size. Transactions
//! pay the same kind of base charge on the write schedule plus whatever their
//! storage access actually costs, measured by [`MeteredStorage`].

use crate::abi::MethodKind;
use cosmwasm_std::{Order, Record, Storage};
use serde::Deserialize;
use std::cell::Cell;

/// KV store gas schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct GasConfig {
    #[serde(default = "default_has_cost")]
    pub has_cost: u64,
    #[serde(default = "default_delete_cost")]
    pub delete_cost: u64,
    #[serde(default = "default_read_cost_flat")]
    pub read_cost_flat: u64,
    #[serde(default = "default_read_cost_per_byte")]
    pub read_cost_per_byte: u64,
    #[serde(default = "default_write_cost_flat")]
    pub write_cost_flat: u64,
    #[serde(default = "default_write_cost_per_byte")]
    pub write_cost_per_byte: u64,
    #[serde(default = "default_iter_next_cost_flat")]
    pub iter_next_cost_flat: u64,
}

fn default_has_cost() -> u64 {
    1000
}

fn default_delete_cost() -> u64 {
    1000
}

fn default_read_cost_flat() -> u64 {
    1000
}

fn default_read_cost_per_byte() -> u64 {
    3
}

fn default_write_cost_flat() -> u64 {
    2000
}

fn default_write_cost_per_byte() -> u64 {
    30
}

fn default_iter_next_cost_flat() -> u64 {
    30
}

impl Default for GasConfig {
    fn default() -> Self {
        Self {
            has_cost: default_has_cost(),
            delete_cost: default_delete_cost(),
            read_cost_flat: default_read_cost_flat(),
            read_cost_per_byte: default_read_cost_per_byte(),
            write_cost_flat: default_write_cost_flat(),
            write_cost_per_byte: default_write_cost_per_byte(),
            iter_next_cost_flat: default_iter_next_cost_flat(),
        }
    }
}

impl GasConfig {
    /// Base gas for a call with `input_len` bytes of calldata.
    pub fn required_gas(&self, input_len: usize, kind: MethodKind) -> u64 {
        let (flat, per_byte) = match kind {
            MethodKind::Query => (self.read_cost_flat, self.read_cost_per_byte),
            MethodKind::Transaction => (self.write_cost_flat, self.write_cost_per_byte),
        };
        flat.saturating_add(per_byte.saturating_mul(input_len as u64))
    }

    fn read_cost(&self, bytes: usize) -> u64 {
        self.read_cost_flat
            .saturating_add(self.read_cost_per_byte.saturating_mul(bytes as u64))
    }

    fn write_cost(&self, bytes: usize) -> u64 {
        self.write_cost_flat
            .saturating_add(self.write_cost_per_byte.saturating_mul(bytes as u64))
    }
}

// ============================================================================
// Metered Storage
// ============================================================================

/// Storage wrapper that charges every access against a [`GasConfig`].
///
/// Accounting only; the host decides what happens when the limit is crossed.
pub struct MeteredStorage<'a> {
    inner: &'a mut dyn Storage,
    config: GasConfig,
    consumed: Cell<u64>,
}

impl<'a> MeteredStorage<'a> {
    pub fn new(inner: &'a mut dyn Storage, config: GasConfig) -> Self {
        Self {
            inner,
            config,
            consumed: Cell::new(0),
        }
    }

    pub fn gas_consumed(&self) -> u64 {
        self.consumed.get()
    }

    fn charge(&self, amount: u64) {
        self.consumed.set(self.consumed.get().saturating_add(amount));
    }
}

impl Storage for MeteredStorage<'_> {
    fn get(&self, key: &[u8]) -> Option<Vec<u8>> {
        let value = self.inner.get(key);
        let len = key.len() + value.as_ref().map_or(0, Vec::len);
        self.charge(self.config.read_cost(len));
        value
    }

    fn range<'b>(
        &'b self,
        start: Option<&[u8]>,
        end: Option<&[u8]>,
        order: Order,
    ) -> Box<dyn Iterator<Item = Record> + 'b> {
        self.charge(self.config.iter_next_cost_flat);

        let consumed = &self.consumed;
        let config = self.config;
        Box::new(self.inner.range(start, end, order).inspect(move |(k, v)| {
            let cost = config
                .iter_next_cost_flat
                .saturating_add(config.read_cost_per_byte.saturating_mul((k.len() + v.len()) as u64));
            consumed.set(consumed.get().saturating_add(cost));
        }))
    }

    fn set(&mut self, key: &[u8], value: &[u8]) {
        self.charge(self.config.write_cost(key.len() + value.len()));
        self.inner.set(key, value);
    }

    fn remove(&mut self, key: &[u8]) {
        self.charge(self.config.delete_cost);
        self.inner.remove(key);
    }
}
