// ==========================================
// Sistema de Contagens APF - API de Importação
// ==========================================
// Responsabilidade: orquestrar o fluxo de importação de planilhas em
// etapas independentes (upload → reconciliação de fatores → mapeamento
// e pontuação → finalização), com o estado intermediário no staging.
// ==========================================

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::api::error::{ApiError, ApiResult};
use crate::config::ConfigManager;
use crate::domain::adjustment::{AdjustmentFactor, NewAdjustmentFactor};
use crate::domain::function::FunctionRecord;
use crate::domain::staging::{CellValue, ImportSession, NewFactorSuggestion, ScoredRow};
use crate::engine::ScoringEngine;
use crate::importer::{AdjustmentReconciler, ColumnMapper, LoadedSheet, SheetLoader};
use crate::repository::{AdjustmentFactorRepository, CountRepository, FunctionRepository};
use crate::staging::StagingStore;

// ==========================================
// Respostas das etapas
// ==========================================

/// Resposta do upload de planilha (etapa 1)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportSheetResponse {
    /// Mensagem de resultado
    pub message: String,
    /// Nome do arquivo recebido
    pub filename: String,
    /// Total de linhas de dados aproveitadas
    pub total_records: usize,
    /// Rótulos de coluna reconstruídos
    pub headers: Vec<String>,
    /// Primeiras linhas para conferência visual
    pub data_preview: Vec<IndexMap<String, CellValue>>,
}

/// Resposta da reconciliação de fatores (etapa 2)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReconcileResponse {
    /// Fatores presentes na planilha e ausentes do cadastro
    pub new_factors: Vec<NewFactorSuggestion>,
}

/// Resposta da confirmação de fatores novos (etapa 2)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfirmFactorsResponse {
    /// Mensagem de resultado
    pub message: String,
    /// Quantidade de fatores efetivamente criados
    pub total_created: usize,
}

/// Resposta do mapeamento e pontuação (etapa 3)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MapScoreResponse {
    /// Mensagem de resultado
    pub message: String,
    /// Total de linhas mapeadas e pontuadas
    pub total_records: usize,
    /// Primeiras linhas calculadas, para conferência antes da etapa 4
    pub preview: Vec<ScoredRow>,
}

/// Resposta da finalização (etapa 4)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinalizeResponse {
    /// Mensagem de resultado
    pub message: String,
    /// Quantidade de funções persistidas na contagem
    pub total_persisted: usize,
}

/// Resposta do abandono de sessão
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AbandonResponse {
    /// Mensagem de resultado
    pub message: String,
    /// true quando havia sessão em andamento e ela foi descartada
    pub removed: bool,
}

// ==========================================
// ImportApi - orquestração das etapas
// ==========================================

/// API de importação de planilhas de contagem
///
/// Cada etapa é uma requisição independente; o vínculo entre elas é a
/// sessão no StagingStore, chaveada pelo id da contagem.
pub struct ImportApi<F: AdjustmentFactorRepository> {
    staging: Arc<StagingStore>,
    factor_repo: Arc<F>,
    count_repo: Arc<CountRepository>,
    function_repo: Arc<FunctionRepository>,
    config: Arc<ConfigManager>,
}

impl<F: AdjustmentFactorRepository> ImportApi<F> {
    /// Cria uma nova instância de ImportApi
    pub fn new(
        staging: Arc<StagingStore>,
        factor_repo: Arc<F>,
        count_repo: Arc<CountRepository>,
        function_repo: Arc<FunctionRepository>,
        config: Arc<ConfigManager>,
    ) -> Self {
        Self {
            staging,
            factor_repo,
            count_repo,
            function_repo,
            config,
        }
    }

    /// Etapa 1: importa a planilha para o staging
    ///
    /// # Parâmetros
    /// - count_id: id da contagem de destino
    /// - filename: nome original do arquivo enviado
    /// - bytes: conteúdo do arquivo .xlsx
    ///
    /// # Retorno
    /// - Ok(ImportSheetResponse): resumo com prévia das primeiras linhas
    /// - Err(ApiError): contagem inexistente, método inválido ou falha de leitura
    ///
    /// # Observações
    /// A contagem e o método são validados antes de abrir o arquivo; um
    /// novo upload para a mesma contagem substitui a sessão anterior.
    pub async fn import_spreadsheet(
        &self,
        count_id: i64,
        filename: &str,
        bytes: &[u8],
    ) -> ApiResult<ImportSheetResponse> {
        // 1. Contagem deve existir e ter método de contagem reconhecido
        let method = self.count_repo.get_counting_method(count_id)?;

        // 2. Leitura da guia correspondente ao método
        let LoadedSheet {
            original_filename,
            headers,
            rows,
        } = SheetLoader::load(filename, bytes, method)?;

        let preview_rows = self
            .config
            .get_import_preview_rows()
            .map_err(|e| ApiError::InternalError(format!("Falha ao ler configuração: {}", e)))?;

        let total_records = rows.len();
        let data_preview: Vec<IndexMap<String, CellValue>> = rows
            .iter()
            .take(preview_rows)
            .map(|row| row.cells.clone())
            .collect();

        // 3. Sessão entra no staging, substituindo qualquer anterior
        self.staging
            .stage(ImportSession::new(count_id, original_filename.clone(), rows));

        tracing::info!(
            count_id = count_id,
            filename = %original_filename,
            total_records = total_records,
            "planilha importada para o staging"
        );

        Ok(ImportSheetResponse {
            message: "Arquivo lido com sucesso!".to_string(),
            filename: original_filename,
            total_records,
            headers,
            data_preview,
        })
    }

    /// Etapa 2a: compara os tipos de projeto da planilha com o cadastro
    ///
    /// # Retorno
    /// - Ok(ReconcileResponse): fatores ainda não cadastrados, com
    ///   multiplicador sugerido lido da própria planilha
    /// - Err(ApiError::SessionNotFound): sem importação em andamento
    pub async fn reconcile_factors(&self, count_id: i64) -> ApiResult<ReconcileResponse> {
        // 1. Exige importação em andamento
        let session = self
            .staging
            .get(count_id)
            .ok_or(ApiError::SessionNotFound(count_id))?;

        // 2. Nomes já cadastrados
        let known_names: HashSet<String> = self
            .factor_repo
            .list_all()
            .await?
            .into_iter()
            .map(|f| f.name)
            .collect();

        // 3. Diferença entre planilha e cadastro
        let new_factors = AdjustmentReconciler::diff(&session.raw_rows, &known_names);

        tracing::info!(
            count_id = count_id,
            new_factors = new_factors.len(),
            "reconciliação de fatores concluída"
        );

        Ok(ReconcileResponse { new_factors })
    }

    /// Etapa 2b: persiste os fatores novos confirmados pelo operador
    ///
    /// Lote atômico: ou todos os fatores entram, ou nenhum. Lista vazia
    /// é sucesso sem efeito.
    pub async fn confirm_factors(
        &self,
        count_id: i64,
        factors: Vec<NewAdjustmentFactor>,
    ) -> ApiResult<ConfirmFactorsResponse> {
        if factors.is_empty() {
            return Ok(ConfirmFactorsResponse {
                message: "Nenhum novo fator para adicionar. Prosseguindo.".to_string(),
                total_created: 0,
            });
        }

        let total_created = self.factor_repo.create_batch(factors).await?;

        tracing::info!(
            count_id = count_id,
            total_created = total_created,
            "fatores de ajuste confirmados"
        );

        Ok(ConfirmFactorsResponse {
            message: "Fatores de ajuste criados com sucesso!".to_string(),
            total_created,
        })
    }

    /// Etapa 3: aplica o mapeamento de colunas e calcula os pontos
    ///
    /// # Parâmetros
    /// - count_id: id da contagem
    /// - mapping: rótulo da planilha → campo de domínio
    ///
    /// # Retorno
    /// - Ok(MapScoreResponse): total processado + prévia das linhas calculadas
    /// - Err(ApiError::SessionNotFound): sem importação em andamento
    ///
    /// # Observações
    /// Linhas que caem fora de todas as faixas da matriz permanecem no
    /// resultado com pontos zerados e geram aviso no log.
    pub async fn map_and_score(
        &self,
        count_id: i64,
        mapping: IndexMap<String, String>,
    ) -> ApiResult<MapScoreResponse> {
        // 1. Sessão com as linhas brutas
        let session = self
            .staging
            .get(count_id)
            .ok_or(ApiError::SessionNotFound(count_id))?;

        // 2. Cadastro completo de fatores (inclui os confirmados na etapa 2)
        let factors: HashMap<String, AdjustmentFactor> = self
            .factor_repo
            .list_all()
            .await?
            .into_iter()
            .map(|f| (f.name.clone(), f))
            .collect();

        // 3. Mapeamento e cálculo linha a linha
        let mapped = ColumnMapper::apply(&mapping, &session.raw_rows, &factors);
        let scored: Vec<ScoredRow> = mapped.iter().map(ScoringEngine::score).collect();

        for row in scored.iter().filter(|r| r.is_unscored()) {
            tracing::warn!(
                count_id = count_id,
                row_number = row.mapped.row_number,
                function_type = %row.mapped.function_type,
                qtd_der = row.mapped.data_element_count,
                qtd_rlr = row.mapped.record_element_count,
                "linha fora de todas as faixas da matriz de complexidade; pontos zerados"
            );
        }

        let total_records = scored.len();
        let preview_rows = self
            .config
            .get_scored_preview_rows()
            .map_err(|e| ApiError::InternalError(format!("Falha ao ler configuração: {}", e)))?;
        let preview: Vec<ScoredRow> = scored.iter().take(preview_rows).cloned().collect();

        // 4. Resultado fica na sessão para a finalização
        if !self.staging.set_processed(count_id, scored) {
            return Err(ApiError::SessionNotFound(count_id));
        }

        tracing::info!(
            count_id = count_id,
            total_records = total_records,
            "mapeamento e pontuação concluídos"
        );

        Ok(MapScoreResponse {
            message: "Mapeamento processado e cálculos realizados com sucesso.".to_string(),
            total_records,
            preview,
        })
    }

    /// Etapa 4: persiste as linhas calculadas como funções da contagem
    ///
    /// Substituição transacional: as funções anteriores da contagem saem
    /// e as da sessão entram; qualquer falha preserva o conjunto antigo.
    /// A sessão é descartada após a persistência.
    pub async fn finalize(&self, count_id: i64) -> ApiResult<FinalizeResponse> {
        // 1. Sessão precisa existir e já ter passado pelo map&score
        let session = self
            .staging
            .get(count_id)
            .ok_or(ApiError::SessionNotFound(count_id))?;

        let processed = session.processed_rows.ok_or_else(|| {
            ApiError::InvalidInput(
                "Nenhuma linha processada; execute o mapeamento antes de finalizar".to_string(),
            )
        })?;

        // 2. Substituição transacional das funções da contagem
        let records: Vec<FunctionRecord> = processed
            .iter()
            .map(|row| FunctionRecord::from_scored_row(count_id, row))
            .collect();

        let total_persisted = self.function_repo.replace_for_count(count_id, &records)?;

        // 3. Sessão cumpriu seu papel; sai do staging
        self.staging.remove(count_id);

        tracing::info!(
            count_id = count_id,
            total_persisted = total_persisted,
            "importação finalizada e funções persistidas"
        );

        Ok(FinalizeResponse {
            message: "Funções da contagem persistidas com sucesso.".to_string(),
            total_persisted,
        })
    }

    /// Descarta a sessão de importação da contagem, se houver
    ///
    /// Idempotente: abandonar sem sessão em andamento é sucesso.
    pub async fn abandon(&self, count_id: i64) -> ApiResult<AbandonResponse> {
        let removed = self.staging.remove(count_id).is_some();

        if removed {
            tracing::info!(count_id = count_id, "sessão de importação abandonada");
        }

        Ok(AbandonResponse {
            message: if removed {
                "Sessão de importação descartada.".to_string()
            } else {
                "Nenhuma sessão de importação em andamento para a contagem.".to_string()
            },
            removed,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::staging::RawRow;
    use crate::domain::types::{AdjustmentKind, CountType, CountingMethod};
    use crate::importer::column_mapper::fields;
    use crate::repository::{
        AdjustmentFactorRepositoryImpl, CountRepository, FunctionRepository, RegistryRepository,
    };
    use rusqlite::Connection;
    use std::sync::Mutex;

    struct Fixture {
        api: ImportApi<AdjustmentFactorRepositoryImpl>,
        function_repo: Arc<FunctionRepository>,
        staging: Arc<StagingStore>,
        count_id: i64,
    }

    fn fixture() -> Fixture {
        let conn = Connection::open_in_memory().expect("Falha ao abrir banco em memória");
        let conn = Arc::new(Mutex::new(conn));

        // Ordem de criação respeita as dependências de chave estrangeira
        let _registry = RegistryRepository::from_connection(conn.clone())
            .expect("Falha ao criar RegistryRepository");
        let factor_repo = Arc::new(
            AdjustmentFactorRepositoryImpl::from_connection(conn.clone())
                .expect("Falha ao criar AdjustmentFactorRepositoryImpl"),
        );
        let count_repo = Arc::new(
            CountRepository::from_connection(conn.clone()).expect("Falha ao criar CountRepository"),
        );
        let function_repo = Arc::new(
            FunctionRepository::from_connection(conn.clone())
                .expect("Falha ao criar FunctionRepository"),
        );
        let config = Arc::new(
            ConfigManager::from_connection(conn).expect("Falha ao criar ConfigManager"),
        );
        let staging = Arc::new(StagingStore::new());

        let count = count_repo
            .create(crate::domain::count::NewCount {
                description: "Contagem de teste".to_string(),
                count_type: CountType::Desenvolvimento,
                counting_method: CountingMethod::Detalhada,
                client_id: None,
                project_id: None,
                system_id: None,
            })
            .expect("Falha ao criar contagem");

        let api = ImportApi::new(
            staging.clone(),
            factor_repo,
            count_repo,
            function_repo.clone(),
            config,
        );

        Fixture {
            api,
            function_repo,
            staging,
            count_id: count.id,
        }
    }

    fn raw_row(row_number: usize, cells: Vec<(&str, CellValue)>) -> RawRow {
        let cells = cells
            .into_iter()
            .map(|(label, value)| (label.to_string(), value))
            .collect();
        RawRow::new(row_number, cells)
    }

    /// Linha única no formato da planilha de exemplo: tipo de projeto
    /// "Novo" com fator 1.2, 5 DER e 1 RLR.
    fn stage_single_row(fx: &Fixture) {
        let rows = vec![raw_row(
            10,
            vec![
                ("Tipo Projeto", CellValue::Text("Novo".to_string())),
                ("Fator Ajuste", CellValue::Number(1.2)),
                ("Qtd DER", CellValue::Number(5.0)),
                ("Qtd RLR", CellValue::Number(1.0)),
            ],
        )];
        fx.staging
            .stage(ImportSession::new(fx.count_id, "contagem.xlsx".to_string(), rows));
    }

    fn mapping() -> IndexMap<String, String> {
        let mut mapping = IndexMap::new();
        mapping.insert("Tipo Projeto".to_string(), fields::FACTOR_NAME.to_string());
        mapping.insert("Qtd DER".to_string(), fields::DER_COUNT.to_string());
        mapping.insert("Qtd RLR".to_string(), fields::RLR_COUNT.to_string());
        mapping
    }

    #[tokio::test]
    async fn test_reconcile_sem_sessao_retorna_session_not_found() {
        let fx = fixture();
        let result = fx.api.reconcile_factors(fx.count_id).await;
        assert!(matches!(result, Err(ApiError::SessionNotFound(id)) if id == fx.count_id));
    }

    #[tokio::test]
    async fn test_import_de_contagem_inexistente_retorna_not_found() {
        let fx = fixture();
        let result = fx.api.import_spreadsheet(999, "x.xlsx", &[]).await;
        assert!(matches!(result, Err(ApiError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_confirm_com_lista_vazia_e_no_op() {
        let fx = fixture();
        let response = fx.api.confirm_factors(fx.count_id, vec![]).await.unwrap();
        assert_eq!(response.total_created, 0);
        assert!(response.message.contains("Nenhum novo fator"));
    }

    #[tokio::test]
    async fn test_fluxo_reconcilia_confirma_mapeia_e_finaliza() {
        let fx = fixture();
        stage_single_row(&fx);

        // Reconciliação sugere o fator da planilha com o multiplicador lido
        let reconcile = fx.api.reconcile_factors(fx.count_id).await.unwrap();
        assert_eq!(reconcile.new_factors.len(), 1);
        assert_eq!(reconcile.new_factors[0].name, "Novo");
        assert_eq!(reconcile.new_factors[0].suggested_multiplier, 1.2);

        // Operador confirma a criação
        let confirm = fx
            .api
            .confirm_factors(
                fx.count_id,
                vec![NewAdjustmentFactor {
                    name: "Novo".to_string(),
                    multiplier: 1.2,
                    kind: AdjustmentKind::Percentual,
                }],
            )
            .await
            .unwrap();
        assert_eq!(confirm.total_created, 1);

        // Sem coluna de tipo mapeada a linha assume ALI: 5 DER, 1 RLR → Baixa
        let score = fx.api.map_and_score(fx.count_id, mapping()).await.unwrap();
        assert_eq!(score.total_records, 1);
        let row = &score.preview[0];
        assert_eq!(row.complexity.to_db_str(), "Baixa");
        assert_eq!(row.gross_points, 7.0);
        assert_eq!(row.net_points, 8.40);
        assert_eq!(row.mapped.adjustment_factor_value, 1.2);
        assert!(row.mapped.adjustment_factor_id.is_some());

        // Finalização persiste e descarta a sessão
        let finalize = fx.api.finalize(fx.count_id).await.unwrap();
        assert_eq!(finalize.total_persisted, 1);
        assert!(fx.staging.get(fx.count_id).is_none());

        let persisted = fx.function_repo.list_by_count(fx.count_id).unwrap();
        assert_eq!(persisted.len(), 1);
        assert_eq!(persisted[0].net_points, 8.40);
    }

    #[tokio::test]
    async fn test_segunda_reconciliacao_nao_repete_fator_cadastrado() {
        let fx = fixture();
        stage_single_row(&fx);

        fx.api
            .confirm_factors(
                fx.count_id,
                vec![NewAdjustmentFactor {
                    name: "Novo".to_string(),
                    multiplier: 1.2,
                    kind: AdjustmentKind::Percentual,
                }],
            )
            .await
            .unwrap();

        let reconcile = fx.api.reconcile_factors(fx.count_id).await.unwrap();
        assert!(reconcile.new_factors.is_empty());
    }

    #[tokio::test]
    async fn test_finalize_sem_map_and_score_retorna_invalid_input() {
        let fx = fixture();
        stage_single_row(&fx);

        let result = fx.api.finalize(fx.count_id).await;
        assert!(matches!(result, Err(ApiError::InvalidInput(_))));

        // A sessão permanece para o operador completar o fluxo
        assert!(fx.staging.get(fx.count_id).is_some());
    }

    #[tokio::test]
    async fn test_finalize_substitui_funcoes_anteriores() {
        let fx = fixture();

        // Primeira importação persiste uma função
        stage_single_row(&fx);
        fx.api
            .confirm_factors(
                fx.count_id,
                vec![NewAdjustmentFactor {
                    name: "Novo".to_string(),
                    multiplier: 1.2,
                    kind: AdjustmentKind::Percentual,
                }],
            )
            .await
            .unwrap();
        fx.api.map_and_score(fx.count_id, mapping()).await.unwrap();
        fx.api.finalize(fx.count_id).await.unwrap();

        // Segunda importação com duas linhas substitui o conjunto
        let rows = vec![
            raw_row(
                10,
                vec![
                    ("Tipo Projeto", CellValue::Text("Novo".to_string())),
                    ("Qtd DER", CellValue::Number(3.0)),
                    ("Qtd RLR", CellValue::Number(1.0)),
                ],
            ),
            raw_row(
                11,
                vec![
                    ("Tipo Projeto", CellValue::Text("Novo".to_string())),
                    ("Qtd DER", CellValue::Number(21.0)),
                    ("Qtd RLR", CellValue::Number(3.0)),
                ],
            ),
        ];
        fx.staging
            .stage(ImportSession::new(fx.count_id, "contagem_v2.xlsx".to_string(), rows));
        fx.api.map_and_score(fx.count_id, mapping()).await.unwrap();
        fx.api.finalize(fx.count_id).await.unwrap();

        let persisted = fx.function_repo.list_by_count(fx.count_id).unwrap();
        assert_eq!(persisted.len(), 2);
    }

    #[tokio::test]
    async fn test_abandon_e_idempotente() {
        let fx = fixture();
        stage_single_row(&fx);

        let first = fx.api.abandon(fx.count_id).await.unwrap();
        assert!(first.removed);

        let second = fx.api.abandon(fx.count_id).await.unwrap();
        assert!(!second.removed);
        assert!(fx.staging.get(fx.count_id).is_none());
    }

    #[tokio::test]
    async fn test_fator_nao_resolvido_mantem_linha_neutra() {
        let fx = fixture();
        stage_single_row(&fx);

        // Sem confirmar o fator: linha permanece com multiplicador neutro
        let score = fx.api.map_and_score(fx.count_id, mapping()).await.unwrap();
        assert_eq!(score.total_records, 1);
        let row = &score.preview[0];
        assert_eq!(row.mapped.adjustment_factor_id, None);
        assert_eq!(row.mapped.adjustment_factor_value, 1.0);
        assert_eq!(row.net_points, 7.0);
    }
}
