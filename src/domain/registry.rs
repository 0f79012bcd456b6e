// ==========================================
// Sistema de Contagens APF - Cadastros Básicos
// ==========================================
// Entidades de referência apontadas pelas contagens: cliente, projeto
// e sistema. Tabelas `cliente`, `projeto`, `sistema`.
// ==========================================

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Client {
    pub id: i64,
    pub name: String, // coluna `nome` (indexada para busca)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: i64,
    pub name: String,           // coluna `nome`
    pub client_id: Option<i64>, // coluna `cliente_id`
}

// "Sistema" no sentido de sistema de software contado, não o host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemEntity {
    pub id: i64,
    pub name: String,           // coluna `nome`
    pub client_id: Option<i64>, // coluna `cliente_id`
}
