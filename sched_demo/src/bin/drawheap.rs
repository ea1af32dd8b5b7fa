// Build a min-heap from integers on the command line and print its
// structure as GraphViz dot on stdout. Node labels are slot values, edges
// follow the array layout: children of slot i at 2i+1 and 2i+2.
//
// Malformed arguments are skipped, matching the sort demo.

use std::fmt::Display;
use std::io::{self, Write};

use jobsched::MinHeap;

fn main() -> io::Result<()> {
    let mut heap = MinHeap::new();
    for arg in std::env::args().skip(1) {
        if let Ok(n) = arg.parse::<i64>() {
            heap.insert(n);
        }
    }
    let stdout = io::stdout();
    render_dot(heap.as_slice(), &mut stdout.lock())
}

fn render_dot<T: Display>(slots: &[T], out: &mut impl Write) -> io::Result<()> {
    writeln!(out, "digraph g {{")?;
    for (i, v) in slots.iter().enumerate() {
        writeln!(out, "N{i} [label=\"{v}\"];")?;
    }
    for i in 0..slots.len() {
        for child in [2 * i + 1, 2 * i + 2] {
            if child < slots.len() {
                writeln!(out, "N{i} -> N{child};")?;
            }
        }
    }
    writeln!(out, "}}")
}
