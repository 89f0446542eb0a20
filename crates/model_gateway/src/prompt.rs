//! The fixed instruction sent with every image.

use wordlens_core::traits::VisionRequest;

/// Instruction asking the model for a JSON array of word entries.
pub const WORD_ANALYSIS_INSTRUCTION: &str = "Please identify any visible words or objects in this image. \
For each word or object, provide its definition and a sample sentence using it. \
Format the response as a JSON array with objects containing 'word', 'definition', and 'sampleSentence' fields.";

/// Build the inference request for an image URL.
pub fn word_analysis_request(image_url: &str) -> VisionRequest {
    VisionRequest {
        instruction: WORD_ANALYSIS_INSTRUCTION.to_string(),
        image_url: image_url.to_string(),
    }
}
