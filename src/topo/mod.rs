//! 示例拓扑

pub mod two_segment;
