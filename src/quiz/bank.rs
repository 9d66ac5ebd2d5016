use std::collections::HashSet;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use thiserror::Error;

use crate::quiz::Question;

#[derive(Error, Debug)]
pub enum BankError {
    #[error("Unable to open question file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Unable to parse question file: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Duplicate question id {0}")]
    DuplicateId(u32),
}

/// Ordered, read-only list of quiz items.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionBank {
    questions: Vec<Question>,
}

impl QuestionBank {
    pub fn new(questions: Vec<Question>) -> Result<Self, BankError> {
        let mut seen = HashSet::new();
        for question in &questions {
            if !seen.insert(question.id) {
                return Err(BankError::DuplicateId(question.id));
            }
        }
        Ok(Self { questions })
    }

    /// The two clips shipped with the site.
    pub fn builtin() -> Self {
        Self {
            questions: vec![
                Question::new(
                    1,
                    "videos/q1_real.mp4",
                    "videos/q1_fake.mp4",
                    "專業分析：請仔細觀察嘴唇邊緣，Deepfake 影片在高速動作時出現輕微的鋸齒狀偽影，這是生成模型常見的破綻。",
                ),
                Question::new(
                    2,
                    "videos/q2_real.mp4",
                    "videos/q2_fake.mp4",
                    "專業分析：Deepfake 影片中的人物眼神接觸略微不自然，且臉部陰影處的顏色漸變不如真實影片平滑，有塊狀感。",
                ),
            ],
        }
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, BankError> {
        let questions: Vec<Question> = serde_json::from_reader(reader)?;
        Self::new(questions)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, BankError> {
        let file = File::open(path)?;
        Self::from_reader(file)
    }

    // Running past the end is how a game learns it is over.
    pub fn get(&self, index: usize) -> Option<&Question> {
        self.questions.get(index)
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }
}
