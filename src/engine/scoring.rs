// ==========================================
// Sistema de Contagens APF - Motor de Cálculo
// ==========================================
// Função pura MappedRow → ScoredRow. Complexidade sai de uma matriz
// fixa RLR×DER por tipo de função; o bruto sai da tabela de pesos e o
// líquido aplica o fator de ajuste com arredondamento half-up em duas
// casas decimais. INM não passa pela matriz: bruto = DER × fator e o
// líquido repete o bruto sem arredondar.
// Combinações fora da matriz nunca geram erro: complexidade N/A e
// pontos zerados, sinalizados por ScoredRow::is_unscored.
// ==========================================

use crate::domain::staging::{MappedRow, ScoredRow};
use crate::domain::types::{Complexity, FunctionType};

pub struct ScoringEngine;

impl ScoringEngine {
    /// Calcula complexidade, PF bruto e PF líquido de uma linha.
    /// Determinística e sem efeitos colaterais.
    pub fn score(row: &MappedRow) -> ScoredRow {
        if row.function_type == FunctionType::Inm {
            let gross = f64::from(row.data_element_count) * row.adjustment_factor_value;
            return ScoredRow {
                mapped: row.clone(),
                complexity: Complexity::NotApplicable,
                gross_points: gross,
                net_points: gross,
            };
        }

        let complexity = Self::classify(
            row.function_type,
            row.record_element_count,
            row.data_element_count,
        );
        let gross = Self::weight(row.function_type, complexity);
        let net = Self::round_half_up(gross * row.adjustment_factor_value, 2);

        ScoredRow {
            mapped: row.clone(),
            complexity,
            gross_points: gross,
            net_points: net,
        }
    }

    /// Matriz de complexidade. DER abaixo de 1 não casa com faixa
    /// nenhuma e resolve para N/A, assim como RLR negativo.
    pub fn classify(
        function_type: FunctionType,
        record_element_count: i32,
        data_element_count: i32,
    ) -> Complexity {
        match function_type {
            FunctionType::Inm => Complexity::NotApplicable,
            _ if data_element_count < 1 => Complexity::NotApplicable,
            FunctionType::Ali | FunctionType::Aie => {
                Self::data_function_tier(record_element_count, data_element_count)
            }
            FunctionType::Ee | FunctionType::Ce => {
                Self::transaction_input_tier(record_element_count, data_element_count)
            }
            FunctionType::Se => Self::output_tier(record_element_count, data_element_count),
        }
    }

    // ALI e AIE compartilham a mesma matriz.
    fn data_function_tier(rlr: i32, der: i32) -> Complexity {
        match rlr {
            1 => {
                if der <= 50 {
                    Complexity::Baixa
                } else {
                    Complexity::Media
                }
            }
            2..=5 => {
                if der <= 19 {
                    Complexity::Baixa
                } else if der <= 50 {
                    Complexity::Media
                } else {
                    Complexity::Alta
                }
            }
            r if r >= 6 => {
                if der <= 19 {
                    Complexity::Media
                } else {
                    Complexity::Alta
                }
            }
            _ => Complexity::NotApplicable,
        }
    }

    // EE e CE compartilham a mesma matriz.
    fn transaction_input_tier(rlr: i32, der: i32) -> Complexity {
        match rlr {
            0..=1 => {
                if der <= 15 {
                    Complexity::Baixa
                } else {
                    Complexity::Media
                }
            }
            2 => {
                if der <= 4 {
                    Complexity::Baixa
                } else if der <= 15 {
                    Complexity::Media
                } else {
                    Complexity::Alta
                }
            }
            r if r >= 3 => {
                if der <= 4 {
                    Complexity::Media
                } else {
                    Complexity::Alta
                }
            }
            _ => Complexity::NotApplicable,
        }
    }

    fn output_tier(rlr: i32, der: i32) -> Complexity {
        match rlr {
            0..=1 => {
                if der <= 19 {
                    Complexity::Baixa
                } else {
                    Complexity::Media
                }
            }
            2..=3 => {
                if der <= 5 {
                    Complexity::Baixa
                } else if der <= 19 {
                    Complexity::Media
                } else {
                    Complexity::Alta
                }
            }
            r if r >= 4 => {
                if der <= 5 {
                    Complexity::Media
                } else {
                    Complexity::Alta
                }
            }
            _ => Complexity::NotApplicable,
        }
    }

    /// Tabela de pesos (PF bruto) por tipo × complexidade.
    /// Combinação fora da tabela vale 0.
    pub fn weight(function_type: FunctionType, complexity: Complexity) -> f64 {
        use Complexity::{Alta, Baixa, Media};
        use FunctionType::{Aie, Ali, Ce, Ee, Se};

        match (function_type, complexity) {
            (Ali, Baixa) => 7.0,
            (Ali, Media) => 10.0,
            (Ali, Alta) => 15.0,
            (Aie, Baixa) => 5.0,
            (Aie, Media) => 7.0,
            (Aie, Alta) => 10.0,
            (Ee, Baixa) | (Ce, Baixa) => 3.0,
            (Ee, Media) | (Ce, Media) => 4.0,
            (Ee, Alta) | (Ce, Alta) => 6.0,
            (Se, Baixa) => 4.0,
            (Se, Media) => 5.0,
            (Se, Alta) => 7.0,
            _ => 0.0,
        }
    }

    /// Arredondamento decimal half-up (metade para longe de zero).
    /// Produtos de fatores decimais chegam em f64 com ruído binário
    /// menor que 1e-9; o ajuste devolve valores de fronteira (x.xx5)
    /// ao lado correto antes do arredondamento. Sem ele, 7 × 1.025
    /// resultaria 7.17 em vez de 7.18.
    pub fn round_half_up(value: f64, decimals: u32) -> f64 {
        let factor = 10f64.powi(decimals as i32);
        let scaled = value * factor;
        (scaled + 1e-9f64.copysign(scaled)).round() / factor
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indexmap::IndexMap;

    fn mapped(
        function_type: FunctionType,
        der: i32,
        rlr: i32,
        factor_value: f64,
    ) -> MappedRow {
        MappedRow {
            row_number: 10,
            name: Some("Função de teste".to_string()),
            description: None,
            function_type,
            data_element_count: der,
            record_element_count: rlr,
            adjustment_factor_name: "Novo".to_string(),
            adjustment_factor_id: Some(1),
            adjustment_factor_value: factor_value,
            extras: IndexMap::new(),
        }
    }

    // ===== matriz ALI/AIE =====

    #[test]
    fn test_data_function_boundaries() {
        use Complexity::*;
        let cases = [
            (1, 50, Baixa),
            (1, 51, Media),
            (2, 19, Baixa),
            (2, 20, Media),
            (5, 50, Media),
            (5, 51, Alta),
            (6, 19, Media),
            (6, 20, Alta),
        ];
        for (rlr, der, expected) in cases {
            assert_eq!(
                ScoringEngine::classify(FunctionType::Ali, rlr, der),
                expected,
                "ALI rlr={} der={}",
                rlr,
                der
            );
            assert_eq!(
                ScoringEngine::classify(FunctionType::Aie, rlr, der),
                expected,
                "AIE rlr={} der={}",
                rlr,
                der
            );
        }
    }

    #[test]
    fn test_data_function_rlr_zero_is_not_applicable() {
        assert_eq!(
            ScoringEngine::classify(FunctionType::Ali, 0, 10),
            Complexity::NotApplicable
        );
    }

    // ===== matriz EE/CE =====

    #[test]
    fn test_transaction_input_boundaries() {
        use Complexity::*;
        let cases = [
            (0, 15, Baixa),
            (1, 16, Media),
            (2, 4, Baixa),
            (2, 5, Media),
            (2, 15, Media),
            (2, 16, Alta),
            (3, 4, Media),
            (3, 5, Alta),
        ];
        for (rlr, der, expected) in cases {
            assert_eq!(
                ScoringEngine::classify(FunctionType::Ee, rlr, der),
                expected,
                "EE rlr={} der={}",
                rlr,
                der
            );
            assert_eq!(
                ScoringEngine::classify(FunctionType::Ce, rlr, der),
                expected,
                "CE rlr={} der={}",
                rlr,
                der
            );
        }
    }

    // ===== matriz SE =====

    #[test]
    fn test_output_boundaries() {
        use Complexity::*;
        let cases = [
            (1, 19, Baixa),
            (1, 20, Media),
            (2, 5, Baixa),
            (3, 6, Media),
            (3, 19, Media),
            (3, 20, Alta),
            (4, 5, Media),
            (4, 6, Alta),
        ];
        for (rlr, der, expected) in cases {
            assert_eq!(
                ScoringEngine::classify(FunctionType::Se, rlr, der),
                expected,
                "SE rlr={} der={}",
                rlr,
                der
            );
        }
    }

    #[test]
    fn test_der_zero_never_matches_a_tier() {
        for t in [
            FunctionType::Ali,
            FunctionType::Aie,
            FunctionType::Ee,
            FunctionType::Ce,
            FunctionType::Se,
        ] {
            assert_eq!(
                ScoringEngine::classify(t, 3, 0),
                Complexity::NotApplicable,
                "{:?}",
                t
            );
        }
    }

    #[test]
    fn test_negative_rlr_is_not_applicable() {
        assert_eq!(
            ScoringEngine::classify(FunctionType::Se, -1, 10),
            Complexity::NotApplicable
        );
    }

    // ===== pesos =====

    #[test]
    fn test_weight_lookup() {
        assert_eq!(ScoringEngine::weight(FunctionType::Ali, Complexity::Alta), 15.0);
        assert_eq!(ScoringEngine::weight(FunctionType::Se, Complexity::Media), 5.0);
        assert_eq!(ScoringEngine::weight(FunctionType::Ee, Complexity::Baixa), 3.0);
        assert_eq!(ScoringEngine::weight(FunctionType::Ce, Complexity::Alta), 6.0);
        assert_eq!(
            ScoringEngine::weight(FunctionType::Ali, Complexity::NotApplicable),
            0.0
        );
        assert_eq!(
            ScoringEngine::weight(FunctionType::Inm, Complexity::Baixa),
            0.0
        );
    }

    // ===== arredondamento =====

    #[test]
    fn test_round_half_up_boundary() {
        assert_eq!(ScoringEngine::round_half_up(7.0 * 1.025, 2), 7.18);
        assert_eq!(ScoringEngine::round_half_up(7.174, 2), 7.17);
        assert_eq!(ScoringEngine::round_half_up(8.4, 2), 8.4);
        assert_eq!(ScoringEngine::round_half_up(2.175, 2), 2.18);
        assert_eq!(ScoringEngine::round_half_up(0.0, 2), 0.0);
        assert_eq!(ScoringEngine::round_half_up(-7.0 * 1.025, 2), -7.18);
    }

    // ===== score completo =====

    #[test]
    fn test_score_ali_low_with_adjustment() {
        let row = mapped(FunctionType::Ali, 5, 1, 1.2);
        let scored = ScoringEngine::score(&row);
        assert_eq!(scored.complexity, Complexity::Baixa);
        assert_eq!(scored.gross_points, 7.0);
        assert_eq!(scored.net_points, 8.4);
        assert!(!scored.is_unscored());
    }

    #[test]
    fn test_score_half_up_rounding_applied_to_net() {
        let row = mapped(FunctionType::Ali, 5, 1, 1.025);
        let scored = ScoringEngine::score(&row);
        assert_eq!(scored.gross_points, 7.0);
        assert_eq!(scored.net_points, 7.18);
    }

    #[test]
    fn test_score_inm_bypasses_matrix() {
        let row = mapped(FunctionType::Inm, 10, 99, 1.1);
        let scored = ScoringEngine::score(&row);
        assert_eq!(scored.complexity, Complexity::NotApplicable);
        assert_eq!(scored.gross_points, 11.0);
        assert_eq!(scored.net_points, 11.0);
        assert!(!scored.is_unscored());
    }

    #[test]
    fn test_score_unmatched_degrades_to_zero() {
        let row = mapped(FunctionType::Ali, 0, 1, 1.2);
        let scored = ScoringEngine::score(&row);
        assert_eq!(scored.complexity, Complexity::NotApplicable);
        assert_eq!(scored.gross_points, 0.0);
        assert_eq!(scored.net_points, 0.0);
        assert!(scored.is_unscored());
    }

    #[test]
    fn test_score_is_deterministic() {
        let row = mapped(FunctionType::Se, 12, 3, 0.9);
        let a = ScoringEngine::score(&row);
        let b = ScoringEngine::score(&row);
        assert_eq!(a.complexity, b.complexity);
        assert_eq!(a.gross_points, b.gross_points);
        assert_eq!(a.net_points, b.net_points);
    }
}
