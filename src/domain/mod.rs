// ==========================================
// Sistema de Contagens APF - Camada de Domínio
// ==========================================
// Responsabilidade: entidades, tipos e estruturas do pipeline.
// Restrição: sem acesso a dados, sem lógica de cálculo.
// ==========================================

pub mod adjustment;
pub mod count;
pub mod function;
pub mod registry;
pub mod staging;
pub mod types;

// Reexporta os tipos centrais
pub use adjustment::{AdjustmentFactor, AdjustmentFactorUpdate, NewAdjustmentFactor};
pub use count::{Count, NewCount};
pub use function::FunctionRecord;
pub use registry::{Client, Project, SystemEntity};
pub use staging::{
    CellValue, ImportSession, MappedRow, NewFactorSuggestion, RawRow, ScoredRow,
};
pub use types::{
    AdjustmentKind, Complexity, CountType, CountingMethod, FunctionType, UnrecognizedValue,
};
