//! Parser for the recombination-collector wire format: a text stream of
//! `<offspring_id> <parent_id> <starting_ploidy> <locus1> <locus2> ...`
//! lines, arriving in maternal/paternal pairs per offspring.
//!
//! Grounded on the Python prototype's `RecombCollector.collect_recombs` and
//! its `i2c(child, child_p)` helper: the wire format's `child` field names
//! the diploid individual and is shared by both lines of a maternal/paternal
//! pair, but each line builds a distinct haploid chromosome, so the two
//! lines must become two distinct internal node IDs derived from that same
//! shared field.

use crate::error::Result;
use crate::recorder::ArgRecorder;
use crate::tsdef::{IdType, Position, Time};
use rand::Rng;

/// Parses recombinator output lines and drives an [`ArgRecorder`].
///
/// `locus_position` must be strictly increasing, with `locus_position[0] ==
/// 0.0` and `locus_position[locus_position.len() - 1] ==
/// sequence_length`; a listed locus index past the end of the table is
/// silently ignored, per the wire-format's "degenerate indices" rule.
pub struct RecombCollector<'a> {
    locus_position: &'a [Position],
    /// Raw `child` field of the previous line, used to tell the second line
    /// of a pair (same `child`) from the first line of the next pair.
    last_child: IdType,
}

impl<'a> RecombCollector<'a> {
    pub fn new(locus_position: &'a [Position]) -> Self {
        RecombCollector {
            locus_position,
            last_child: -1,
        }
    }

    fn ind_to_time(&self, _input_id: IdType) -> Option<Time> {
        // Mapping an input ID to a birth time is a property of the driving
        // simulator's ID scheme, which this collector does not assume;
        // callers that need the prototype's "nonoverlapping generations"
        // shortcut can track it themselves and call `add_individual`
        // directly before feeding lines through `collect_recombs`.
        None
    }

    /// Consume any number of complete offspring pairs from `lines`. Each
    /// line builds one haploid chromosome: its internal node ID is derived
    /// from the line's `child` field and whether it is the first or second
    /// line of its pair (same `child` as the previous line), so the two
    /// lines of a pair never collide onto one node. The chromosome is
    /// registered with `add_individual` at `time`, then each listed locus
    /// index draws a uniform breakpoint in `(locus_position[i],
    /// locus_position[i+1])` via `rng`, alternating the contributing
    /// parental ploidy, with a final segment running from the last
    /// breakpoint to `sequence_length`.
    pub fn collect_recombs(
        &mut self,
        recorder: &mut ArgRecorder,
        lines: &str,
        time: Time,
        population: i32,
        rng: &mut impl Rng,
    ) -> Result<()> {
        let sequence_length = recorder.sequence_length();
        for line in lines.lines().filter(|l| !l.trim().is_empty()) {
            let fields: Vec<i64> = line
                .split_whitespace()
                .map(|x| x.parse().expect("malformed recombination-collector line"))
                .collect();
            let child = fields[0] as IdType;
            let parent = fields[1] as IdType;
            let mut ploidy = fields[2] as usize;
            let loci = &fields[3..];

            let parity: IdType = if child == self.last_child { 1 } else { 0 };
            self.last_child = child;
            let chromosome = child * 2 + parity;

            recorder.add_individual(
                chromosome,
                time,
                crate::flags::NodeFlags::IS_SAMPLE,
                population,
            )?;

            let parent_chromosomes = [parent, parent];
            let mut start = 0.0;
            for &locus in loci {
                let idx = locus as usize;
                if idx + 1 >= self.locus_position.len() {
                    continue;
                }
                let breakpoint = rng.gen_range(self.locus_position[idx]..self.locus_position[idx + 1]);
                recorder.add_record(start, breakpoint, parent_chromosomes[ploidy], &[chromosome])?;
                start = breakpoint;
                ploidy = (ploidy + 1) % 2;
            }
            recorder.add_record(start, sequence_length, parent_chromosomes[ploidy], &[chromosome])?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flags::NodeFlags;
    use crate::tsdef::NULL_POPULATION;
    use rand::SeedableRng;

    #[test]
    fn test_single_offspring_no_recombination() {
        let mut recorder = ArgRecorder::new(10.0).unwrap();
        recorder
            .add_individual(1, 0.0, NodeFlags::IS_SAMPLE, NULL_POPULATION)
            .unwrap();

        let loci = [0.0, 10.0];
        let mut collector = RecombCollector::new(&loci);
        let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(1);
        collector
            .collect_recombs(&mut recorder, "2 1 0\n", 1.0, NULL_POPULATION, &mut rng)
            .unwrap();

        assert_eq!(recorder.tables().num_nodes(), 2);
        assert_eq!(recorder.tables().num_edges(), 1);
        let edge = recorder.tables().edges()[0];
        assert_eq!(edge.left, 0.0);
        assert_eq!(edge.right, 10.0);
    }

    #[test]
    fn test_recombination_draws_breakpoint_in_range() {
        let mut recorder = ArgRecorder::new(10.0).unwrap();
        recorder
            .add_individual(1, 0.0, NodeFlags::IS_SAMPLE, NULL_POPULATION)
            .unwrap();

        let loci = [0.0, 4.0, 10.0];
        let mut collector = RecombCollector::new(&loci);
        let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(7);
        collector
            .collect_recombs(&mut recorder, "2 1 0 0\n", 1.0, NULL_POPULATION, &mut rng)
            .unwrap();

        assert_eq!(recorder.tables().num_edges(), 2);
        let first = recorder.tables().edges()[0];
        assert!(first.left == 0.0 && first.right > 0.0 && first.right < 4.0);
        let second = recorder.tables().edges()[1];
        assert_eq!(second.left, first.right);
        assert_eq!(second.right, 10.0);
    }

    #[test]
    fn test_degenerate_locus_index_ignored() {
        let mut recorder = ArgRecorder::new(10.0).unwrap();
        recorder
            .add_individual(1, 0.0, NodeFlags::IS_SAMPLE, NULL_POPULATION)
            .unwrap();

        let loci = [0.0, 10.0];
        let mut collector = RecombCollector::new(&loci);
        let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(3);
        collector
            .collect_recombs(&mut recorder, "2 1 0 5\n", 1.0, NULL_POPULATION, &mut rng)
            .unwrap();

        assert_eq!(recorder.tables().num_edges(), 1);
    }

    /// A maternal/paternal pair shares one `child` field on the wire but
    /// must become two distinct chromosome nodes, each with its own parent.
    #[test]
    fn test_pair_produces_two_distinct_chromosome_nodes() {
        let mut recorder = ArgRecorder::new(10.0).unwrap();
        recorder
            .add_individual(1, 0.0, NodeFlags::IS_SAMPLE, NULL_POPULATION)
            .unwrap();
        recorder
            .add_individual(2, 0.0, NodeFlags::IS_SAMPLE, NULL_POPULATION)
            .unwrap();

        let loci = [0.0, 10.0];
        let mut collector = RecombCollector::new(&loci);
        let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(11);
        collector
            .collect_recombs(&mut recorder, "3 1 0\n3 2 1\n", 1.0, NULL_POPULATION, &mut rng)
            .unwrap();

        assert_eq!(recorder.tables().num_nodes(), 4);
        assert_eq!(recorder.tables().num_edges(), 2);
        let maternal = recorder.tables().edges()[0];
        let paternal = recorder.tables().edges()[1];
        assert_ne!(maternal.child, paternal.child);
        assert_eq!(maternal.parent, 0);
        assert_eq!(paternal.parent, 1);
    }
}
