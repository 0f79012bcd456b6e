// ==========================================
// Sistema de Contagens APF - Ponto de Entrada
// ==========================================
// Inicializa logs, resolve o caminho do banco, monta o AppState e
// executa uma varredura de sessões de importação expiradas.
// As operações de negócio são expostas pela biblioteca (camada api).
// ==========================================

use apf_contagens::app::{get_default_db_path, AppState};

#[tokio::main]
async fn main() {
    // Inicializa o sistema de logs
    apf_contagens::logging::init();

    tracing::info!("==================================================");
    tracing::info!("{}", apf_contagens::APP_NAME);
    tracing::info!("Versão do sistema: {}", apf_contagens::VERSION);
    tracing::info!("==================================================");

    // Resolve o caminho do banco de dados
    let db_path = get_default_db_path();
    tracing::info!("Usando banco de dados: {}", db_path);

    // Monta o AppState
    tracing::info!("Inicializando AppState...");
    let app_state = AppState::new(db_path).expect("Falha ao inicializar o AppState");
    tracing::info!("AppState inicializado com sucesso");

    // Varredura única de sessões de staging expiradas; não há tarefas
    // em segundo plano, a varredura roda quando o host invoca.
    let ttl_minutes = match app_state.config_manager.get_session_ttl_minutes() {
        Ok(minutes) => minutes,
        Err(e) => {
            tracing::warn!("Falha ao ler TTL de sessões, usando padrão de 120 minutos: {}", e);
            120
        }
    };
    let removed = app_state
        .staging
        .evict_stale(chrono::Duration::minutes(ttl_minutes));
    tracing::info!(
        ttl_minutes = ttl_minutes,
        removidas = removed,
        "Varredura de sessões de importação concluída"
    );

    tracing::info!(
        sessoes_ativas = app_state.staging.len(),
        "Sistema pronto; operações disponíveis pela camada de API"
    );
}
