//! System instructions for the chat routes.

use super::providers::ChatMessage;

/// Free-text assistant: answer from the supplied catalog rows only.
pub fn assistant_instructions(products: &str) -> String {
    format!(
        "You are a helpful product assistant. Use the following product catalog data to answer user questions.\n\
         Be concise and helpful. Only recommend products from the provided data.\n\
         \n\
         Available Products:\n\
         {products}\n\
         \n\
         If no relevant products are found, politely inform the user."
    )
}

/// Recommendation assistant: same grounding, JSON reply.
pub fn recommendation_instructions(products: &str) -> String {
    format!(
        r#"You are a product recommendation assistant. Analyze the user's request and the available products.
Return a JSON response with the following structure:
{{
    "recommendations": [
        {{
            "productName": "string",
            "reason": "string",
            "confidence": "high|medium|low"
        }}
    ],
    "summary": "Brief summary of recommendations"
}}

Available Products:
{products}"#
    )
}

/// A single-turn conversation; no history is carried between requests.
pub fn conversation(instructions: String, user_message: &str) -> Vec<ChatMessage> {
    vec![ChatMessage::system(instructions), ChatMessage::user(user_message)]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::providers::ChatRole;

    const PRODUCTS: &str = r#"[{"product_name":"Trail Shell","price":129.0}]"#;

    #[test]
    fn assistant_instructions_embed_products_verbatim() {
        let prompt = assistant_instructions(PRODUCTS);

        assert!(prompt.contains(&format!("Available Products:\n{}\n", PRODUCTS)));
        assert!(prompt.contains("Only recommend products from the provided data."));
    }

    #[test]
    fn recommendation_instructions_describe_the_json_shape() {
        let prompt = recommendation_instructions(PRODUCTS);

        assert!(prompt.contains(r#""recommendations": ["#));
        assert!(prompt.contains(r#""confidence": "high|medium|low""#));
        assert!(prompt.contains(r#""summary": "Brief summary of recommendations""#));
        assert!(prompt.ends_with(PRODUCTS));
    }

    #[test]
    fn conversation_is_system_then_user() {
        let messages = conversation(assistant_instructions(""), "need boots");

        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, ChatRole::System);
        assert_eq!(messages[1].role, ChatRole::User);
        assert_eq!(messages[1].content, "need boots");
    }
}
