//! Prompt construction for the burnout analysis.
//!
//! Pure functions: no I/O.

use serde_json::{Value, json};

use super::trait_def::GenerationRequest;

/// Persona and task given to the model on every request.
pub const SYSTEM_INSTRUCTION: &str = "You are Neura, a compassionate AI wellness doctor \
specializing in burnout detection and stress management. Analyze the user's input for signs of \
burnout, stress, and emotional exhaustion. Based on your analysis, provide a gentle, step-by-step \
action plan to help the user. Your tone should be empathetic, professional, and reassuring. You can \
suggest an interactive guided breathing exercise for one of the steps by setting the 'type' field \
to 'breathing'. Do this when a relaxation or mindfulness step is appropriate. Respond with a valid \
JSON object matching the provided schema.";

/// Structured-output schema: `{analysis:{sentiment,summary}, plan:[{step,title,description,type?}]}`.
pub fn response_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "analysis": {
                "type": "OBJECT",
                "properties": {
                    "sentiment": {
                        "type": "STRING",
                        "description": "A brief (2-5 words) sentiment analysis of the user's text, e.g., 'High Stress Levels Detected' or 'Signs of Emotional Exhaustion'."
                    },
                    "summary": {
                        "type": "STRING",
                        "description": "A compassionate, one-paragraph summary of the user's feelings, acknowledging their struggle. This should sound like a caring doctor or therapist."
                    }
                },
                "required": ["sentiment", "summary"]
            },
            "plan": {
                "type": "ARRAY",
                "description": "A personalized, step-by-step action plan with 3-5 steps to help the user manage their burnout symptoms.",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "step": {
                            "type": "INTEGER",
                            "description": "The step number in the plan."
                        },
                        "title": {
                            "type": "STRING",
                            "description": "A short, actionable title for the step, e.g., 'Mindful Breathing' or 'Digital Sunset'."
                        },
                        "description": {
                            "type": "STRING",
                            "description": "A detailed but easy-to-follow description of the activity for this step. Provide clear instructions."
                        },
                        "type": {
                            "type": "STRING",
                            "description": "The type of content for this step. Use 'text' for standard descriptions. For a guided breathing exercise, use 'breathing'. If suggesting a breathing exercise, keep the description brief as the UI will be interactive."
                        }
                    },
                    "required": ["step", "title", "description"]
                }
            }
        },
        "required": ["analysis", "plan"]
    })
}

/// The single user turn sent for an entry.
pub fn user_contents(text: &str) -> String {
    format!("User input: \"{text}\"")
}

/// Assemble the full generation request for an entry.
pub fn build_request(text: &str) -> GenerationRequest {
    GenerationRequest {
        system_instruction: SYSTEM_INSTRUCTION.to_string(),
        contents: user_contents(text),
        response_schema: response_schema(),
    }
}
