// ==========================================
// Sistema de Contagens APF - Camada de Importação
// ==========================================
// Responsabilidade: transformar os bytes da planilha enviada em linhas
// prontas para o cálculo, em etapas independentes dirigidas pelo
// operador: leitura → reconciliação de fatores → mapeamento de colunas.
// ==========================================

// Declaração dos módulos
pub mod column_mapper;
pub mod error;
pub mod header;
pub mod reconciler;
pub mod sheet_loader;

// Reexportação dos tipos centrais
pub use column_mapper::ColumnMapper;
pub use error::{ImportError, ImportResult};
pub use header::HeaderReconstructor;
pub use reconciler::AdjustmentReconciler;
pub use sheet_loader::{LoadedSheet, SheetLoader};
