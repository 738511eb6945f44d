//! AI Integration Layer
//!
//! Provider access, prompt construction, and validation of model output for
//! estimate generation.

pub mod prompt;
pub mod provider;
pub mod timeout;
pub mod validation;

pub use prompt::{PromptBuilder, PromptSection, PromptTemplates};
pub use provider::{
    AnthropicProvider, CredentialSource, EnvCredentials, LayeredCredentials, LlmProvider,
    OpenAiCompatibleProvider, ProviderCompletion, ProviderConfig, ProviderGateway,
    ProviderGatewayBuilder, ProviderInfo, ProviderKind, SamplingParams, SharedCredentials,
    SharedProvider, StaticCredentials, create_provider,
};
pub use timeout::with_timeout;
pub use validation::{
    extract_json_array, parse_line_item_response, strip_code_fence, validate_line_item,
    validate_line_items,
};
