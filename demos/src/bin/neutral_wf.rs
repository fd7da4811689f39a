//! A minimal diploid Wright-Fisher simulation, recombining and recording
//! its ARG through an [`arg_recorder::ArgRecorder`], periodically
//! simplifying down to the currently-alive population.

use arg_recorder::{ArgRecorder, NodeFlags};
use clap::Parser;
use rand::rngs::StdRng;
use rand::Rng;
use rand::SeedableRng;
use rand_distr::Uniform;

#[derive(Parser, Debug)]
#[command(about = "Neutral diploid Wright-Fisher simulation with ARG recording")]
struct Args {
    /// Diploid population size
    #[arg(short = 'N', long, default_value_t = 1000)]
    popsize: i32,

    /// Number of generations to simulate
    #[arg(short = 'n', long, default_value_t = 1000)]
    ngenerations: i32,

    /// Genome length
    #[arg(short = 'L', long, default_value_t = 1.0)]
    genome_length: f64,

    /// Simplify every `simplify_interval` generations
    #[arg(short = 's', long, default_value_t = 100)]
    simplify_interval: i32,

    /// Random number seed
    #[arg(short = 'S', long, default_value_t = 0)]
    seed: u64,
}

fn run(args: &Args) -> ArgRecorder {
    let mut rng = StdRng::seed_from_u64(args.seed);
    let mut recorder = ArgRecorder::new(args.genome_length).unwrap();

    let mut next_id: i32 = 0;
    let mut alive: Vec<i32> = Vec::with_capacity(2 * args.popsize as usize);
    for _ in 0..(2 * args.popsize) {
        recorder
            .add_individual(next_id, 0.0, NodeFlags::IS_SAMPLE, -1)
            .unwrap();
        alive.push(next_id);
        next_id += 1;
    }

    let parent_picker = Uniform::new(0, args.popsize as usize);

    for gen in 1..=args.ngenerations {
        let mut offspring: Vec<i32> = Vec::with_capacity(alive.len());
        for _ in 0..args.popsize {
            let mother = rng.sample(parent_picker) * 2;
            let father = rng.sample(parent_picker) * 2;

            for parent_chromosomes in [
                [alive[mother], alive[mother + 1]],
                [alive[father], alive[father + 1]],
            ] {
                let child = next_id;
                next_id += 1;
                recorder
                    .add_individual(child, gen as f64, NodeFlags::IS_SAMPLE, -1)
                    .unwrap();

                if args.genome_length > 1.0 && rng.gen_bool(0.5) {
                    let breakpoint = rng.gen_range(0.0..args.genome_length);
                    recorder
                        .add_record(0.0, breakpoint, parent_chromosomes[0], &[child])
                        .unwrap();
                    recorder
                        .add_record(breakpoint, args.genome_length, parent_chromosomes[1], &[child])
                        .unwrap();
                } else {
                    recorder
                        .add_record(0.0, args.genome_length, parent_chromosomes[0], &[child])
                        .unwrap();
                }

                offspring.push(child);
            }
        }

        alive = offspring;

        if gen % args.simplify_interval == 0 {
            recorder.simplify(&alive).unwrap();
            alive = (0..alive.len() as i32).collect();
            log::info!(
                "generation {}: simplified to {} nodes, {} simplifications so far",
                gen,
                recorder.tables().num_nodes(),
                recorder.num_simplifies()
            );
        }
    }

    recorder.simplify(&alive).unwrap();
    recorder
}

fn main() {
    env_logger::init();
    let args = Args::parse();
    let recorder = run(&args);
    log::info!(
        "done: {} nodes, {} edges after {} simplifications",
        recorder.tables().num_nodes(),
        recorder.tables().num_edges(),
        recorder.num_simplifies()
    );
}
