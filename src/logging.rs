// ==========================================
// Inicialização do sistema de logs
// ==========================================
// Ferramentas: tracing e tracing-subscriber
// Nível de log controlado por variável de ambiente
// ==========================================

use tracing_subscriber::{fmt, EnvFilter};

/// Inicializa o sistema de logs
///
/// # Variáveis de ambiente
/// - RUST_LOG: filtro de nível de log (padrão: info)
///   Exemplos: RUST_LOG=debug ou RUST_LOG=apf_contagens=trace
///
/// # Exemplo
/// ```no_run
/// use apf_contagens::logging;
/// logging::init();
/// ```
pub fn init() {
    // Lê o nível de log do ambiente; padrão info
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    // Formato dos registros
    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_line_number(true)
        .init();
}

/// Inicializa os logs para o ambiente de testes
///
/// Nível mais detalhado, com saída capturada pelo runner de testes
pub fn init_test() {
    let _ = fmt()
        .with_env_filter(EnvFilter::new("debug"))
        .with_test_writer()
        .try_init();
}
