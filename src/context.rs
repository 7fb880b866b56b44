// In: src/context.rs

//! The write-transaction root: one open file context per writer instance.
//!
//! A `FileContext` owns the pieces the transform layer shares across one
//! sequential buffer-fill pass: the shared write buffer, the spec store,
//! and the active group's variables. Independent writer instances own
//! disjoint contexts; no state is shared across them.

use crate::buffer::WriteBuffer;
use crate::config::WriterConfig;
use crate::executor::OutputMode;
use crate::spec::SpecStore;
use crate::variable::Variable;

/// The active group's variable list.
#[derive(Debug, Default)]
pub struct Group {
    vars: Vec<Variable>,
}

impl Group {
    pub fn push(&mut self, var: Variable) -> usize {
        self.vars.push(var);
        self.vars.len() - 1
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Variable> {
        self.vars.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut Variable> {
        self.vars.get_mut(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Variable> {
        self.vars.iter()
    }
}

#[derive(Debug)]
pub struct FileContext {
    pub config: WriterConfig,
    pub buffer: WriteBuffer,
    pub specs: SpecStore,
    pub group: Group,
}

impl FileContext {
    pub fn new(config: WriterConfig) -> Self {
        let buffer = WriteBuffer::with_capacity(config.initial_buffer_capacity);
        Self {
            config,
            buffer,
            specs: SpecStore::new(),
            group: Group::default(),
        }
    }

    /// The output mode the configuration permits for transform execution.
    pub fn output_mode(&self) -> OutputMode {
        if self.config.allow_shared_buffer_output {
            OutputMode::SharedAllowed
        } else {
            OutputMode::PrivateOnly
        }
    }
}

impl Default for FileContext {
    fn default() -> Self {
        Self::new(WriterConfig::default())
    }
}
