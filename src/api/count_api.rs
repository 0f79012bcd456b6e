// ==========================================
// Sistema de Contagens APF - API de Contagens
// ==========================================
// Responsabilidade: criação e consulta de contagens e de suas funções
// persistidas. Listagens com filtro ficam fora do escopo.
// ==========================================

use std::sync::Arc;

use crate::api::error::{ApiError, ApiResult};
use crate::domain::count::{Count, NewCount};
use crate::domain::function::FunctionRecord;
use crate::repository::{CountRepository, FunctionRepository};

/// API de contagens
pub struct CountApi {
    count_repo: Arc<CountRepository>,
    function_repo: Arc<FunctionRepository>,
}

impl CountApi {
    /// Cria uma nova instância de CountApi
    pub fn new(count_repo: Arc<CountRepository>, function_repo: Arc<FunctionRepository>) -> Self {
        Self {
            count_repo,
            function_repo,
        }
    }

    /// Cria uma contagem
    ///
    /// # Retorno
    /// - Ok(Count): registro criado, com id
    /// - Err(ApiError): descrição vazia ou vínculo inexistente
    pub fn create(&self, count: NewCount) -> ApiResult<Count> {
        if count.description.trim().is_empty() {
            return Err(ApiError::InvalidInput(
                "Descrição da contagem não pode ser vazia".to_string(),
            ));
        }

        let created = self.count_repo.create(count)?;

        tracing::info!(
            count_id = created.id,
            metodo = %created.counting_method,
            "contagem criada"
        );

        Ok(created)
    }

    /// Busca uma contagem por id
    pub fn get(&self, id: i64) -> ApiResult<Count> {
        self.count_repo
            .find_by_id(id)?
            .ok_or_else(|| ApiError::NotFound("Contagem não encontrada".to_string()))
    }

    /// Funções persistidas de uma contagem, na ordem de inserção
    ///
    /// A contagem precisa existir; contagem sem funções devolve lista
    /// vazia.
    pub fn get_count_functions(&self, count_id: i64) -> ApiResult<Vec<FunctionRecord>> {
        if self.count_repo.find_by_id(count_id)?.is_none() {
            return Err(ApiError::NotFound("Contagem não encontrada".to_string()));
        }

        Ok(self.function_repo.list_by_count(count_id)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::{CountType, CountingMethod};
    use crate::repository::RegistryRepository;
    use rusqlite::Connection;
    use std::sync::Mutex;

    fn api() -> CountApi {
        let conn = Connection::open_in_memory().expect("Falha ao abrir banco em memória");
        let conn = Arc::new(Mutex::new(conn));

        // Ordem de criação respeita as dependências de chave estrangeira
        let _registry = RegistryRepository::from_connection(conn.clone())
            .expect("Falha ao criar RegistryRepository");
        let _factors = crate::repository::AdjustmentFactorRepositoryImpl::from_connection(
            conn.clone(),
        )
        .expect("Falha ao criar AdjustmentFactorRepositoryImpl");
        let count_repo = Arc::new(
            CountRepository::from_connection(conn.clone()).expect("Falha ao criar CountRepository"),
        );
        let function_repo = Arc::new(
            FunctionRepository::from_connection(conn).expect("Falha ao criar FunctionRepository"),
        );

        CountApi::new(count_repo, function_repo)
    }

    fn nova_contagem(description: &str) -> NewCount {
        NewCount {
            description: description.to_string(),
            count_type: CountType::Desenvolvimento,
            counting_method: CountingMethod::Detalhada,
            client_id: None,
            project_id: None,
            system_id: None,
        }
    }

    #[test]
    fn test_create_e_get() {
        let api = api();

        let created = api.create(nova_contagem("Portal do cliente")).unwrap();
        assert!(created.id > 0);

        let fetched = api.get(created.id).unwrap();
        assert_eq!(fetched.description, "Portal do cliente");
        assert_eq!(fetched.counting_method, CountingMethod::Detalhada);
    }

    #[test]
    fn test_create_com_descricao_vazia_retorna_invalid_input() {
        let api = api();
        let result = api.create(nova_contagem("  "));
        assert!(matches!(result, Err(ApiError::InvalidInput(_))));
    }

    #[test]
    fn test_get_inexistente_retorna_not_found() {
        let api = api();
        let result = api.get(99);
        match result {
            Err(ApiError::NotFound(msg)) => assert_eq!(msg, "Contagem não encontrada"),
            _ => panic!("Esperava NotFound"),
        }
    }

    #[test]
    fn test_funcoes_de_contagem_sem_importacao_e_lista_vazia() {
        let api = api();
        let created = api.create(nova_contagem("Contagem nova")).unwrap();

        let functions = api.get_count_functions(created.id).unwrap();
        assert!(functions.is_empty());
    }

    #[test]
    fn test_funcoes_de_contagem_inexistente_retorna_not_found() {
        let api = api();
        let result = api.get_count_functions(99);
        assert!(matches!(result, Err(ApiError::NotFound(_))));
    }
}
