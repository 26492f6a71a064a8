use std::cell::Cell;
use std::rc::{Rc, Weak};
use std::time::{Duration, Instant};

use anyhow::{anyhow, Result};
use serde::Serialize;

use crate::config::PrepassConfig;
use crate::engine::Prepass;
use crate::errors::Interrupt;
use crate::hooks::use_ref;
use crate::types::{host, ElementType, FunctionComponent, Node, Props, Value};

/// Hard cap so a typo in --depth does not build a tree that never finishes
const MAX_NODES: u64 = 2_000_000;

pub struct BenchmarkParams {
    pub depth: u32,
    pub breadth: u32,
    pub suspend_every: u64,
    pub config: PrepassConfig,
    pub json: bool,
}

#[derive(Debug, Serialize)]
pub struct BenchmarkReport {
    pub nodes: u64,
    pub visited: u64,
    pub suspensions: u64,
    pub duration_ms: f64,
    pub nodes_per_sec: f64,
    pub cooperative_yield: bool,
    pub yield_after_ms: u64,
}

pub async fn run_benchmark(params: BenchmarkParams) -> Result<BenchmarkReport> {
    validate_params(&params)?;
    let nodes = tree_size(params.depth, params.breadth);

    if !params.json {
        println!("🚀 Starting prepass benchmark");
        println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
        println!("\n📋 Configuration:");
        println!("   Depth: {}", params.depth);
        println!("   Breadth: {}", params.breadth);
        println!("   Nodes: {}", nodes);
        if params.suspend_every > 0 {
            println!("   Suspend every: {} nodes", params.suspend_every);
        }
        println!(
            "   Cooperative yield: {} ({}ms slices)",
            params.config.cooperative_yield, params.config.yield_after_ms
        );
    }

    let visited = Rc::new(Cell::new(0u64));
    let suspensions = Rc::new(Cell::new(0u64));
    let root = synthetic_tree(&params, suspensions.clone());

    let counter = visited.clone();
    let start = Instant::now();
    Prepass::new(params.config.clone())
        .visitor(move |_, _| {
            counter.set(counter.get() + 1);
            Ok(())
        })
        .run(root)
        .await
        .map_err(|e| anyhow!("Prepass failed: {}", e))?;
    let elapsed = start.elapsed();

    let report = BenchmarkReport {
        nodes,
        visited: visited.get(),
        suspensions: suspensions.get(),
        duration_ms: elapsed.as_secs_f64() * 1000.0,
        nodes_per_sec: per_second(visited.get(), elapsed),
        cooperative_yield: params.config.cooperative_yield,
        yield_after_ms: params.config.yield_after_ms,
    };

    if params.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }

    Ok(report)
}

fn validate_params(params: &BenchmarkParams) -> Result<()> {
    if params.depth == 0 {
        return Err(anyhow!("--depth must be at least 1"));
    }
    if params.breadth == 0 {
        return Err(anyhow!("--breadth must be at least 1"));
    }
    if tree_size(params.depth, params.breadth) > MAX_NODES {
        return Err(anyhow!(
            "Tree of depth {} and breadth {} exceeds {} nodes",
            params.depth,
            params.breadth,
            MAX_NODES
        ));
    }
    Ok(())
}

/// Evaluated nodes in a complete tree: breadth + breadth^2 + ... + breadth^depth
fn tree_size(depth: u32, breadth: u32) -> u64 {
    let mut total: u64 = 0;
    let mut level: u64 = 1;
    for _ in 0..depth {
        level = level.saturating_mul(breadth as u64);
        total = total.saturating_add(level);
    }
    total
}

fn per_second(count: u64, elapsed: Duration) -> f64 {
    let secs = elapsed.as_secs_f64();
    if secs == 0.0 {
        return 0.0;
    }
    count as f64 / secs
}

/// Function components `breadth` wide and `depth` deep, each wrapped in a host element
///
/// Nodes are numbered in heap order; every `suspend_every`-th node suspends once
/// for a scheduler tick before rendering its children.
fn synthetic_tree(params: &BenchmarkParams, suspensions: Rc<Cell<u64>>) -> Node {
    let breadth = params.breadth as u64;
    let depth = params.depth as u64;
    let suspend_every = params.suspend_every;

    let component = Rc::new_cyclic(|this: &Weak<FunctionComponent>| {
        let this = this.clone();
        FunctionComponent::new("SyntheticNode", move |props: &Props| {
            let index = props.get("index").and_then(Value::as_num).unwrap_or(0.0) as u64;
            let level = props.get("level").and_then(Value::as_num).unwrap_or(0.0) as u64;

            if suspend_every > 0 && index % suspend_every == 0 {
                let suspended = use_ref(|| false)?;
                if !suspended.replace(true) {
                    suspensions.set(suspensions.get() + 1);
                    return Err(Interrupt::suspend(async {
                        tokio::task::yield_now().await;
                        Ok(())
                    }));
                }
            }

            let Some(component) = this.upgrade().filter(|_| level < depth) else {
                return Ok(Node::Empty);
            };
            let ty = ElementType::Function(component);
            let children = (0..breadth)
                .map(|i| child(&ty, index * breadth + i + 1, level + 1))
                .collect::<Vec<_>>();
            Ok(host("div", Props::new().with_children(children)))
        })
    });
    let ty = ElementType::Function(component);

    let roots = (0..breadth).map(|i| child(&ty, i + 1, 1)).collect::<Vec<_>>();
    Node::from(roots)
}

fn child(ty: &ElementType, index: u64, level: u64) -> Node {
    ty.element(
        Props::new()
            .with("index", Value::Num(index as f64))
            .with("level", Value::Num(level as f64)),
    )
}

fn print_report(report: &BenchmarkReport) {
    println!("\n📊 Results:");
    println!("   Visited: {}/{}", report.visited, report.nodes);
    println!("   Suspensions: {}", report.suspensions);
    println!("   Duration: {:.2}ms", report.duration_ms);
    println!("   Throughput: {:.0} nodes/sec", report.nodes_per_sec);
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
}
