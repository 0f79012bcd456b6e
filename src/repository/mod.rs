// ==========================================
// Sistema de Contagens APF - Camada de Repositório
// ==========================================
// Responsabilidade: acesso a dados sem regra de negócio.
// Restrição: toda consulta é parametrizada.
// ==========================================

pub mod adjustment_factor_repo;
pub mod adjustment_factor_repo_impl;
pub mod count_repo;
pub mod error;
pub mod function_repo;
pub mod registry_repo;

// Reexportação dos repositórios
pub use adjustment_factor_repo::AdjustmentFactorRepository;
pub use adjustment_factor_repo_impl::AdjustmentFactorRepositoryImpl;
pub use count_repo::CountRepository;
pub use error::{RepositoryError, RepositoryResult};
pub use function_repo::FunctionRepository;
pub use registry_repo::RegistryRepository;
