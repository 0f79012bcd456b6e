// ==========================================
// Sistema de Contagens APF - Staging de Importação
// ==========================================
// Guarda em memória, por contagem, o estado intermediário do fluxo de
// importação entre requisições independentes (upload → reconciliação →
// mapeamento → persistência). Uma sessão por contagem; novo upload
// substitui a sessão anterior. Nada aqui é durável: reiniciar o
// processo perde as importações em andamento.
// ==========================================

use crate::domain::staging::{ImportSession, ScoredRow};
use chrono::{Duration, Utc};
use dashmap::DashMap;

pub struct StagingStore {
    // chave: id da contagem
    sessions: DashMap<i64, ImportSession>,
}

impl StagingStore {
    pub fn new() -> Self {
        Self {
            sessions: DashMap::new(),
        }
    }

    /// Registra a sessão da contagem, substituindo qualquer anterior.
    pub fn stage(&self, session: ImportSession) {
        let count_id = session.count_id;
        if self.sessions.insert(count_id, session).is_some() {
            tracing::info!(
                "sessão de importação da contagem {} substituída por novo upload",
                count_id
            );
        }
    }

    /// Cópia da sessão da contagem, se houver importação em andamento.
    pub fn get(&self, count_id: i64) -> Option<ImportSession> {
        self.sessions.get(&count_id).map(|s| s.clone())
    }

    /// Grava as linhas calculadas na sessão existente. Retorna false
    /// quando a contagem não tem sessão em andamento.
    pub fn set_processed(&self, count_id: i64, rows: Vec<ScoredRow>) -> bool {
        match self.sessions.get_mut(&count_id) {
            Some(mut session) => {
                session.processed_rows = Some(rows);
                session.touch();
                true
            }
            None => false,
        }
    }

    /// Descarta a sessão da contagem (finalização ou abandono).
    /// Sem sessão é um no-op.
    pub fn remove(&self, count_id: i64) -> Option<ImportSession> {
        self.sessions.remove(&count_id).map(|(_, s)| s)
    }

    /// Remove sessões sem atividade desde o corte. Retorna quantas
    /// foram descartadas.
    pub fn evict_stale(&self, max_age: Duration) -> usize {
        let cutoff = Utc::now() - max_age;
        let before = self.sessions.len();
        self.sessions.retain(|_, session| session.updated_at >= cutoff);
        let evicted = before.saturating_sub(self.sessions.len());
        if evicted > 0 {
            tracing::info!("varredura de staging: {} sessão(ões) expirada(s)", evicted);
        }
        evicted
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

impl Default for StagingStore {
    fn default() -> Self {
        Self::new()
    }
}
