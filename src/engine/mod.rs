// ==========================================
// Sistema de Contagens APF - Camada de Cálculo
// ==========================================
// Responsabilidade: regras de pontuação APF puras, sem SQL e sem I/O.
// Toda linha mapeada recebe complexidade, PF bruto e PF líquido.
// ==========================================

pub mod scoring;

// Reexportação do motor
pub use scoring::ScoringEngine;
