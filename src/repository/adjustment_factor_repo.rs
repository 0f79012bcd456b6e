// ==========================================
// Sistema de Contagens APF - Repositório de Fatores de Ajuste
// ==========================================
// Responsabilidade: definir o contrato de acesso a dados dos fatores
// de ajuste. Sem regra de negócio: só CRUD.
// ==========================================

use crate::domain::adjustment::{AdjustmentFactor, AdjustmentFactorUpdate, NewAdjustmentFactor};
use crate::repository::error::RepositoryResult;
use async_trait::async_trait;

/// Contrato de acesso a dados dos fatores de ajuste
#[async_trait]
pub trait AdjustmentFactorRepository: Send + Sync {
    /// Todos os fatores cadastrados, em ordem de nome
    async fn list_all(&self) -> RepositoryResult<Vec<AdjustmentFactor>>;

    /// Fator por id
    async fn find_by_id(&self, id: i64) -> RepositoryResult<Option<AdjustmentFactor>>;

    /// Fator por nome (igualdade exata)
    async fn find_by_name(&self, name: &str) -> RepositoryResult<Option<AdjustmentFactor>>;

    /// Insere um fator e devolve o registro com id
    async fn create(&self, factor: NewAdjustmentFactor) -> RepositoryResult<AdjustmentFactor>;

    /// Insere um lote de fatores em transação única.
    /// Tudo ou nada: qualquer falha desfaz o lote inteiro.
    async fn create_batch(&self, factors: Vec<NewAdjustmentFactor>) -> RepositoryResult<usize>;

    /// Atualização parcial; campos não informados ficam como estão
    async fn update(
        &self,
        id: i64,
        changes: AdjustmentFactorUpdate,
    ) -> RepositoryResult<AdjustmentFactor>;

    /// Remove o fator por id
    async fn delete(&self, id: i64) -> RepositoryResult<()>;
}
