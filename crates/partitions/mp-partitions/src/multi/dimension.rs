use crate::definition::PartitionsDefinition;

/// A named dimension of a multi-partitions definition.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PartitionDimensionDefinition {
    pub name: String,
    pub partitions_def: PartitionsDefinition,
}

impl PartitionDimensionDefinition {
    pub fn new(name: impl Into<String>, partitions_def: PartitionsDefinition) -> Self {
        Self {
            name: name.into(),
            partitions_def,
        }
    }

    /// Check if the dimension is time-windowed.
    pub fn is_time_window(&self) -> bool {
        self.partitions_def.as_time_window().is_some()
    }
}

impl std::fmt::Display for PartitionDimensionDefinition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.name, self.partitions_def)
    }
}
