// BQL streaming modules for velobql
// The execution core consumes compiled plans from the analyzer and feeds
// result rows back to the surrounding topology.

pub mod bql;
