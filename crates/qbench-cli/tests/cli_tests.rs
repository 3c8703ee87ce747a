//! CLI argument parsing and command flow tests.
//!
//! The CLI is a binary crate, so the clap structs are mirrored here and the
//! command flows are exercised through the library crates they call.

// ============================================================================
// Clap argument parsing (test via try_parse_from on equivalent structs)
// ============================================================================

mod clap_parsing {
    use clap::{Args, Parser, Subcommand, ValueEnum};
    use std::path::PathBuf;

    // Mirror the CLI struct for testing (since main.rs is a binary)
    #[derive(Parser)]
    #[command(name = "qbench")]
    struct TestCli {
        #[arg(short, long, action = clap::ArgAction::Count, global = true)]
        verbose: u8,

        #[arg(long, global = true)]
        config: Option<PathBuf>,

        #[command(subcommand)]
        command: TestCommands,
    }

    #[derive(Subcommand)]
    enum TestCommands {
        Evaluate(TestEvaluateArgs),
        Pygsti {
            #[arg(short, long)]
            input: PathBuf,
            #[arg(short, long, default_value = "1")]
            qubits: usize,
            #[arg(short, long)]
            shots: Option<u32>,
            #[arg(long)]
            force_new: bool,
            #[arg(long)]
            cache_dir: Option<PathBuf>,
            #[arg(short, long)]
            output: Option<PathBuf>,
        },
        Cache {
            #[command(subcommand)]
            action: TestCacheAction,
        },
        Version,
    }

    #[derive(Subcommand)]
    enum TestCacheAction {
        List {
            #[arg(short, long)]
            workflow: String,
            #[arg(long)]
            cache_dir: Option<PathBuf>,
        },
    }

    #[derive(Args)]
    struct TestEvaluateArgs {
        #[arg(short, long, value_enum)]
        metric: TestMetric,
        #[arg(short, long, value_enum, default_value = "rotation-sweep")]
        workflow: TestWorkflow,
        #[arg(long, default_value = "X")]
        rotations: String,
        #[arg(long, default_value_t = -90.0, allow_negative_numbers = true)]
        start: f64,
        #[arg(long, default_value_t = 90.0, allow_negative_numbers = true)]
        end: f64,
        #[arg(long, default_value_t = 2)]
        points: usize,
        #[arg(short, long, default_value_t = 1)]
        qubits: usize,
        #[arg(short, long)]
        shots: Option<u32>,
        #[arg(long)]
        force_new: bool,
        #[arg(long)]
        mle: bool,
        #[arg(long)]
        spam_correct: bool,
        #[arg(long)]
        identifier: Option<String>,
        #[arg(long)]
        cache_dir: Option<PathBuf>,
        #[arg(short, long)]
        output: Option<PathBuf>,
    }

    #[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
    enum TestMetric {
        Confusion,
        CircuitFidelity,
        StateDensity,
        ProcessMatrix,
        StateFidelity,
        ProcessFidelity,
    }

    #[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
    enum TestWorkflow {
        RotationSweep,
        Spam,
    }

    // --- Evaluate command ---

    #[test]
    fn test_parse_evaluate_minimal() {
        let cli = TestCli::try_parse_from(["qbench", "evaluate", "-m", "process-fidelity"]).unwrap();
        match cli.command {
            TestCommands::Evaluate(args) => {
                assert_eq!(args.metric, TestMetric::ProcessFidelity);
                assert_eq!(args.workflow, TestWorkflow::RotationSweep);
                assert_eq!(args.rotations, "X");
                assert_eq!(args.start, -90.0);
                assert_eq!(args.end, 90.0);
                assert_eq!(args.points, 2);
                assert!(args.shots.is_none());
                assert!(!args.force_new);
                assert!(!args.mle);
                assert!(!args.spam_correct);
            }
            _ => panic!("Expected Evaluate command"),
        }
    }

    #[test]
    fn test_parse_evaluate_sweep_with_negative_bounds() {
        let cli = TestCli::try_parse_from([
            "qbench",
            "-vv",
            "evaluate",
            "--metric",
            "state-fidelity",
            "--rotations",
            "YX",
            "--start",
            "-45",
            "--end",
            "-10",
            "--points",
            "5",
            "--shots",
            "2000",
            "--mle",
            "--force-new",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 2);
        match cli.command {
            TestCommands::Evaluate(args) => {
                assert_eq!(args.metric, TestMetric::StateFidelity);
                assert_eq!(args.rotations, "YX");
                assert_eq!(args.start, -45.0);
                assert_eq!(args.end, -10.0);
                assert_eq!(args.points, 5);
                assert_eq!(args.shots, Some(2000));
                assert!(args.mle);
                assert!(args.force_new);
            }
            _ => panic!("Expected Evaluate command"),
        }
    }

    #[test]
    fn test_parse_evaluate_spam_confusion() {
        let cli = TestCli::try_parse_from([
            "qbench",
            "evaluate",
            "-m",
            "confusion",
            "-w",
            "spam",
            "-q",
            "2",
            "--identifier",
            "calibration",
            "-o",
            "confusion.json",
        ])
        .unwrap();
        match cli.command {
            TestCommands::Evaluate(args) => {
                assert_eq!(args.metric, TestMetric::Confusion);
                assert_eq!(args.workflow, TestWorkflow::Spam);
                assert_eq!(args.qubits, 2);
                assert_eq!(args.identifier.as_deref(), Some("calibration"));
                assert_eq!(args.output, Some(PathBuf::from("confusion.json")));
            }
            _ => panic!("Expected Evaluate command"),
        }
    }

    #[test]
    fn test_parse_evaluate_missing_metric() {
        assert!(TestCli::try_parse_from(["qbench", "evaluate"]).is_err());
    }

    #[test]
    fn test_parse_evaluate_unknown_metric() {
        let result = TestCli::try_parse_from(["qbench", "evaluate", "-m", "purity"]);
        assert!(result.is_err());
    }

    // --- Pygsti command ---

    #[test]
    fn test_parse_pygsti() {
        let cli = TestCli::try_parse_from([
            "qbench",
            "pygsti",
            "-i",
            "circuits.txt",
            "-q",
            "2",
            "--cache-dir",
            "/tmp/cache",
        ])
        .unwrap();
        match cli.command {
            TestCommands::Pygsti {
                input,
                qubits,
                shots,
                force_new,
                cache_dir,
                output,
            } => {
                assert_eq!(input, PathBuf::from("circuits.txt"));
                assert_eq!(qubits, 2);
                assert!(shots.is_none());
                assert!(!force_new);
                assert_eq!(cache_dir, Some(PathBuf::from("/tmp/cache")));
                assert!(output.is_none());
            }
            _ => panic!("Expected Pygsti command"),
        }
    }

    #[test]
    fn test_parse_pygsti_missing_input() {
        assert!(TestCli::try_parse_from(["qbench", "pygsti"]).is_err());
    }

    // --- Cache and version commands ---

    #[test]
    fn test_parse_cache_list() {
        let cli =
            TestCli::try_parse_from(["qbench", "cache", "list", "-w", "RotationSweep_QST"]).unwrap();
        match cli.command {
            TestCommands::Cache {
                action: TestCacheAction::List { workflow, cache_dir },
            } => {
                assert_eq!(workflow, "RotationSweep_QST");
                assert!(cache_dir.is_none());
            }
            _ => panic!("Expected Cache command"),
        }
    }

    #[test]
    fn test_parse_global_config_after_subcommand() {
        let cli =
            TestCli::try_parse_from(["qbench", "version", "--config", "qbench.yaml"]).unwrap();
        assert!(matches!(cli.command, TestCommands::Version));
        assert_eq!(cli.config, Some(PathBuf::from("qbench.yaml")));
    }
}

// ============================================================================
// Command flows
// ============================================================================

mod command_flows {
    use std::fs;
    use std::io::BufReader;
    use std::sync::Arc;

    use qbench_adapter_sim::{ReadoutError, SimulatorBackend};
    use qbench_bench::{
        BenchError, ConfusionMatrix, FileCache, Metric, PyGstiBenchmark, PyGstiDataset, PyGstiResults,
        QuantumStateFidelity, Rotation, RotationSweep, Session, SpamBenchmark, StateTomography,
        Task, TaskCache,
    };

    /// Equivalent to commands::common::build_session
    fn build_session(shots: u32, readout: Option<ReadoutError>) -> Session {
        let mut backend = SimulatorBackend::new().with_seed(11);
        if let Some(readout) = readout {
            backend = backend.with_readout_error(readout);
        }
        Session::new(Arc::new(backend), shots).unwrap()
    }

    #[test]
    fn test_pygsti_file_to_dataset_text() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("circuits.txt");
        fs::write(&input, "# germs\n{}@(0)\nGxpi2:0@(0)\n\nGxpi2:0Gxpi2:0@(0)\n").unwrap();

        let file = fs::File::open(&input).unwrap();
        let workflow = PyGstiBenchmark::new(BufReader::new(file), 1, build_session(500, None)).unwrap();
        let cache = FileCache::new(dir.path().join("cache"));
        let values = PyGstiResults::new(workflow)
            .evaluate(&cache, false, false, None)
            .unwrap();
        let (_, dataset) = values.into_iter().next_back().unwrap();

        let text = dataset.to_text();
        assert!(text.starts_with("## Columns = 0 count, 1 count"));
        let reparsed = PyGstiDataset::parse(&text).unwrap();
        assert_eq!(reparsed, dataset);
        assert_eq!(reparsed.rows().len(), 3);
        // Two pi/2 rotations flip the qubit.
        assert_eq!(reparsed.rows()[0].counts, vec![500, 0]);
        assert_eq!(reparsed.rows()[2].counts, vec![0, 500]);
    }

    #[test]
    fn test_pygsti_bad_line_reports_line_number() {
        let text = "{}@(0)\nGq:0@(0)\n";
        let err = PyGstiBenchmark::new(text.as_bytes(), 1, build_session(10, None)).unwrap_err();
        assert!(matches!(err, BenchError::Parse { line: 2, .. }), "{err}");
    }

    #[test]
    fn test_cache_list_after_evaluation() {
        let dir = tempfile::tempdir().unwrap();
        let cache = FileCache::new(dir.path());
        let sweep = RotationSweep::new(
            Rotation::parse_sequence("Z").unwrap(),
            -90.0,
            90.0,
            3,
            build_session(1000, None),
        )
        .unwrap();
        let metric = QuantumStateFidelity::new(StateTomography::new(sweep));
        let values = metric.evaluate(&cache, false, false, None).unwrap();
        let (timestamp, fidelities) = values.into_iter().next().unwrap();
        assert_eq!(fidelities.len(), 3);

        let listed: Vec<Task> = Task::ALL
            .into_iter()
            .filter(|&task| {
                cache
                    .timestamps("RotationSweep_QST", task)
                    .unwrap()
                    .contains(&timestamp)
            })
            .collect();
        assert!(listed.contains(&Task::MeasureCounts));
        assert!(listed.contains(&Task::IdealDensity));
        assert!(listed.contains(&Task::Session));
        assert!(!listed.contains(&Task::IdealProcess));
    }

    #[test]
    fn test_spam_calibration_sees_readout_error() {
        let dir = tempfile::tempdir().unwrap();
        let cache = FileCache::new(dir.path());
        let session = build_session(
            50_000,
            Some(ReadoutError::Uniform {
                p01: 0.05,
                p10: 0.1,
            }),
        );
        let metric = ConfusionMatrix::new(SpamBenchmark::new(1, session).unwrap());
        let (_, matrix) = metric
            .evaluate(&cache, false, false, None)
            .unwrap()
            .pop_last()
            .unwrap();
        assert!((matrix[[0, 1]] - 0.05).abs() < 0.01, "{matrix}");
        assert!((matrix[[1, 0]] - 0.1).abs() < 0.01, "{matrix}");
    }
}
