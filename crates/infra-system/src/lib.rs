// Busload Infrastructure - System Adapters
// Implements: CpuProbe

pub mod cpu_probe_impl;

pub use cpu_probe_impl::SysinfoCpuProbe;
