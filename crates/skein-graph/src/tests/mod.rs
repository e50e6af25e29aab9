//! Test suite for skein-graph.

mod chunk_tests;
mod graph_tests;
