//! Node flags.

use bitflags::bitflags;

bitflags! {
    /// Flags stored alongside each row of the [node table](crate::tables::NodeTable).
    #[derive(Default)]
    pub struct NodeFlags: u32 {
        /// The node's complete ancestry must be preserved by simplification.
        const IS_SAMPLE = 1 << 0;
    }
}

impl NodeFlags {
    /// Does this flag set mark a sample?
    pub fn is_sample(self) -> bool {
        self.contains(NodeFlags::IS_SAMPLE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_flag_round_trips() {
        let f = NodeFlags::IS_SAMPLE;
        assert!(f.is_sample());
        assert!(!NodeFlags::empty().is_sample());
    }
}
