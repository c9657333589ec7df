use thiserror::Error;

/// Erreurs détectées à l'entrée du moteur. Toutes sont définitives :
/// aucun calcul partiel n'est retourné après une erreur.
#[derive(Debug, Error, PartialEq)]
pub enum PredictError {
    #[error("pool de candidats vide")]
    EmptyPool,

    #[error("k={requested} hors limites pour une pool de {pool_size}")]
    CountOutOfRange { requested: usize, pool_size: usize },

    #[error("poids dégénérés : la somme doit être strictement positive")]
    DegenerateWeights,

    #[error("aucun historique exploitable")]
    EmptyHistory,

    #[error("plan de slots invalide : {0}")]
    InvalidSlots(String),

    #[error("configuration invalide : {0}")]
    InvalidConfig(String),
}
