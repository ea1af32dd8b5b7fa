// Exercise the heap on its own: insert every integer given on the command
// line, then extract until empty. Output is the input, sorted ascending.
// Malformed arguments are skipped.

use jobsched::MinHeap;

fn main() {
    let mut heap = MinHeap::new();
    for arg in std::env::args().skip(1) {
        if let Ok(n) = arg.parse::<i64>() {
            heap.insert(n);
        }
    }
    while let Ok(n) = heap.extract_min() {
        println!("{n}");
    }
}
