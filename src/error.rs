use thiserror::Error;

#[derive(Error, Debug)]
pub enum QuizError {
    #[error("Answer input {0:?} is not a whole number")]
    InvalidAnswerInput(String),
    #[error("Answer slot {0} does not exist")]
    AnswerSlotOutOfRange(usize),
    #[error("Invalid tuning: {0}")]
    InvalidTuning(String),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Parse the text payload of an answer button
pub fn parse_answer(payload: &str) -> Result<u32, QuizError> {
    payload
        .trim()
        .parse::<u32>()
        .map_err(|_| QuizError::InvalidAnswerInput(payload.to_string()))
}
