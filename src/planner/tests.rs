//! Planner tests against an in-memory filesystem.

use super::*;
use crate::exec::{CommandError, MockCommandRunner};
use crate::parser;
use crate::probe::MockFileSystemProbe;
use rstest::rstest;
use std::cell::RefCell;
use std::collections::HashMap;
use std::io;
use std::rc::Rc;
use std::time::{Duration, SystemTime};

/// File timestamps in seconds since the epoch, shared with [`FakeRunner`].
#[derive(Debug, Clone, Default)]
struct FakeFs(Rc<RefCell<HashMap<String, u64>>>);

impl FakeFs {
    fn with(files: &[(&str, u64)]) -> Self {
        let fs = Self::default();
        for (name, secs) in files {
            fs.set(name, *secs);
        }
        fs
    }

    fn set(&self, name: &str, secs: u64) {
        self.0.borrow_mut().insert(name.to_owned(), secs);
    }
}

impl FileSystemProbe for FakeFs {
    fn probe(&self, path: &Utf8Path) -> io::Result<SystemTime> {
        self.0
            .borrow()
            .get(path.as_str())
            .map(|secs| SystemTime::UNIX_EPOCH + Duration::from_secs(*secs))
            .ok_or_else(|| io::Error::from(io::ErrorKind::NotFound))
    }
}

/// Records commands; `touch NAME` stamps `NAME` with a fresh time and
/// `fail` exits with status 1.
#[derive(Debug)]
struct FakeRunner {
    fs: FakeFs,
    clock: u64,
    log: Vec<String>,
}

impl FakeRunner {
    fn new(fs: FakeFs) -> Self {
        Self {
            fs,
            clock: 100,
            log: Vec::new(),
        }
    }
}

impl CommandRunner for FakeRunner {
    fn run(&mut self, command: &str) -> Result<(), CommandError> {
        self.log.push(command.to_owned());
        if command == "fail" {
            return Err(CommandError::Exit {
                command: command.to_owned(),
                status: Some(1),
            });
        }
        if let Some(name) = command.strip_prefix("touch ") {
            self.clock += 1;
            self.fs.set(name, self.clock);
        }
        Ok(())
    }
}

fn build(
    rules: &str,
    target: Option<&str>,
    fs: &FakeFs,
) -> (Result<BuildReport, BuildError>, Vec<String>) {
    let mut graph = parser::parse(rules).expect("parse");
    let root = select_target(&graph, target).expect("target");
    let mut planner = BuildPlanner::new(fs.clone(), FakeRunner::new(fs.clone()));
    let result = planner.build(&mut graph, root);
    let (_, runner) = planner.into_parts();
    (result, runner.log)
}

const APP: &str = "app : main.o\n\ttouch app\nmain.o :\n\ttouch main.o\n";

#[rstest]
fn missing_plain_dependency_is_fatal() {
    let fs = FakeFs::default();
    let (result, log) = build("app : main.o\n\tcc -o app main.o\n", None, &fs);
    let err = result.expect_err("should fail");
    assert!(
        matches!(&err, BuildError::MissingLeaf { name, source } if name == "main.o" && source.kind() == io::ErrorKind::NotFound),
        "unexpected error: {err:?}"
    );
    assert!(log.is_empty());
}

#[rstest]
fn missing_files_build_dependencies_first() {
    let fs = FakeFs::default();
    let (result, log) = build(APP, Some("app"), &fs);
    let report = result.expect("build");
    assert_eq!(log, vec!["touch main.o", "touch app"]);
    assert_eq!(report.executed, log);
    assert!(!report.is_up_to_date());
}

#[rstest]
fn newer_target_is_up_to_date() {
    let fs = FakeFs::with(&[("main.o", 10), ("app", 20)]);
    let (result, log) = build(APP, Some("app"), &fs);
    let report = result.expect("build");
    assert!(report.is_up_to_date());
    assert_eq!(report.target, "app");
    assert!(log.is_empty());
}

#[rstest]
#[case::dependency_newer(30, 20, true)]
#[case::equal_times(20, 20, false)]
#[case::target_newer(10, 20, false)]
fn staleness_uses_strict_comparison(
    #[case] dep_time: u64,
    #[case] target_time: u64,
    #[case] rebuilds: bool,
) {
    let fs = FakeFs::with(&[("main.o", dep_time), ("app", target_time)]);
    let (result, log) = build(APP, None, &fs);
    result.expect("build");
    let expected: Vec<String> = if rebuilds {
        vec!["touch app".into()]
    } else {
        Vec::new()
    };
    assert_eq!(log, expected);
}

#[rstest]
fn one_newer_dependency_forces_rebuild() {
    let rules = "app : a.o b.o c.o\n\ttouch app\n";
    let fs = FakeFs::with(&[("a.o", 1), ("b.o", 50), ("c.o", 2), ("app", 10)]);
    let (result, log) = build(rules, None, &fs);
    result.expect("build");
    assert_eq!(log, vec!["touch app"]);
}

#[rstest]
fn second_build_of_same_graph_runs_nothing() {
    let fs = FakeFs::default();
    let mut graph = parser::parse(APP).expect("parse");
    let root = select_target(&graph, None).expect("root");
    let mut planner = BuildPlanner::new(fs.clone(), FakeRunner::new(fs.clone()));

    let first = planner.build(&mut graph, root).expect("first build");
    assert_eq!(first.executed.len(), 2);
    let second = planner.build(&mut graph, root).expect("second build");
    assert!(second.is_up_to_date());
    assert_eq!(planner.runner().log.len(), 2);
}

#[rstest]
fn shared_dependency_rebuilds_once() {
    let rules = "all : x y\nx : common\n\ttouch x\ny : common\n\ttouch y\ncommon :\n\ttouch common\n";
    let fs = FakeFs::default();
    let (result, log) = build(rules, None, &fs);
    result.expect("build");
    assert_eq!(log, vec!["touch common", "touch x", "touch y"]);
}

#[rstest]
fn dependencies_run_in_declaration_order() {
    let rules = "all : zeta alpha mid\nalpha :\n\ttouch alpha\nmid :\n\ttouch mid\nzeta :\n\ttouch zeta\n";
    let fs = FakeFs::default();
    let (result, log) = build(rules, None, &fs);
    result.expect("build");
    assert_eq!(log, vec!["touch zeta", "touch alpha", "touch mid"]);
}

#[rstest]
fn two_node_cycle_is_reported_and_skipped() {
    let rules = "a : b\n\ttouch a\nb : a\n\ttouch b\n";
    let fs = FakeFs::with(&[("a", 10), ("b", 5)]);
    let (result, log) = build(rules, None, &fs);
    let report = result.expect("cycle is not fatal");
    assert_eq!(
        report.cycles,
        vec![CycleEdge {
            from: "b".into(),
            to: "a".into(),
        }]
    );
    assert!(log.is_empty());
}

#[rstest]
fn cycle_edge_does_not_hide_other_staleness() {
    let rules = "a : b\n\ttouch a\nb : a c\n\ttouch b\n";
    let fs = FakeFs::with(&[("a", 10), ("b", 5), ("c", 7)]);
    let (result, log) = build(rules, None, &fs);
    let report = result.expect("build");
    assert_eq!(report.cycles.len(), 1);
    // c is newer than b, so b rebuilds and then a sees a newer b.
    assert_eq!(log, vec!["touch b", "touch a"]);
}

#[rstest]
fn self_dependency_is_a_cycle() {
    let fs = FakeFs::with(&[("a", 1)]);
    let (result, _) = build("a : a\n\ttouch a\n", None, &fs);
    let report = result.expect("build");
    assert_eq!(
        report.cycles,
        vec![CycleEdge {
            from: "a".into(),
            to: "a".into(),
        }]
    );
}

#[rstest]
fn output_still_missing_after_recipe_forces_parent_rebuild() {
    let fs = FakeFs::with(&[("all", 10)]);
    let mut graph = parser::parse("all : x\n\ttouch all\nx :\n\techo x\n").expect("parse");
    let root = select_target(&graph, None).expect("root");
    let mut planner = BuildPlanner::new(fs.clone(), FakeRunner::new(fs));

    let report = planner.build(&mut graph, root).expect("build");
    assert_eq!(report.executed, vec!["echo x", "touch all"]);
    let x = graph.lookup("x").expect("x");
    assert!(!graph.node(x).exists());
    assert_eq!(graph.node(x).modified(), None);
}

#[rstest]
fn target_without_file_or_recipe_is_fatal() {
    let fs = FakeFs::default();
    let (result, _) = build("all :\n", None, &fs);
    assert!(matches!(result, Err(BuildError::NoRecipe { name }) if name == "all"));
}

#[rstest]
fn phony_target_without_commands_still_propagates() {
    let rules = "all : app\napp : main.o\n\ttouch app\n";
    let fs = FakeFs::with(&[("main.o", 5), ("app", 1)]);
    let (result, log) = build(rules, None, &fs);
    result.expect("build");
    assert_eq!(log, vec!["touch app"]);
}

#[rstest]
fn failing_command_aborts_the_build() {
    let rules = "all : first second\n\ttouch all\nfirst :\n\tfail\n\ttouch first\nsecond :\n\ttouch second\n";
    let fs = FakeFs::default();
    let (result, log) = build(rules, None, &fs);
    let err = result.expect_err("should fail");
    assert!(matches!(err, BuildError::Command(CommandError::Exit { .. })));
    assert_eq!(log, vec!["fail"]);
}

#[rstest]
fn failing_command_stops_mocked_runner() {
    let mut graph = parser::parse("app : lib\n\tlink app\nlib :\n\tcompile lib\n\tarchive lib\n")
        .expect("parse");
    let root = select_target(&graph, Some("app")).expect("root");

    let mut probe = MockFileSystemProbe::new();
    probe
        .expect_probe()
        .returning(|_| Err(io::Error::from(io::ErrorKind::NotFound)));
    let mut runner = MockCommandRunner::new();
    runner
        .expect_run()
        .withf(|command| command == "compile lib")
        .times(1)
        .returning(|command| {
            Err(CommandError::Exit {
                command: command.to_owned(),
                status: Some(2),
            })
        });

    let mut planner = BuildPlanner::new(probe, runner);
    let err = planner.build(&mut graph, root).expect_err("should fail");
    match err {
        BuildError::Command(failure) => assert_eq!(failure.command(), "compile lib"),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[rstest]
fn nodes_are_done_after_build() {
    let fs = FakeFs::with(&[("main.o", 10), ("app", 20)]);
    let mut graph = parser::parse(APP).expect("parse");
    let root = select_target(&graph, None).expect("root");
    let mut planner = BuildPlanner::new(fs.clone(), FakeRunner::new(fs));
    planner.build(&mut graph, root).expect("build");
    assert!(graph.nodes().all(|(_, node)| node.state() == VisitState::Done));
}

#[rstest]
fn deep_chain_does_not_exhaust_the_stack() {
    const DEPTH: usize = 50_000;
    let mut rules = String::new();
    let fs = FakeFs::default();
    for idx in 0..DEPTH {
        rules.push_str(&format!("n{idx} : n{}\n", idx + 1));
        fs.set(&format!("n{idx}"), 10);
    }
    fs.set(&format!("n{DEPTH}"), 10);
    let (result, log) = build(&rules, None, &fs);
    let report = result.expect("build");
    assert!(report.is_up_to_date());
    assert!(log.is_empty());
}

#[rstest]
#[case(Some("missing"))]
fn unknown_target_is_not_found(#[case] target: Option<&str>) {
    let graph = parser::parse(APP).expect("parse");
    let err = select_target(&graph, target).expect_err("should fail");
    assert!(matches!(err, BuildError::NotFound { target } if target == "missing"));
}

#[rstest]
fn empty_graph_has_no_default_target() {
    let graph = parser::parse("\n\n").expect("parse");
    assert!(matches!(
        select_target(&graph, None),
        Err(BuildError::NoTargets)
    ));
}
