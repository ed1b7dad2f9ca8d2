use super::values::ResolvedParam;

/// Substitute every resolved path parameter into its `{name}` token.
/// Tokens without a resolved parameter are left in place.
pub fn materialize(template: &str, parameters: &[ResolvedParam]) -> String {
    parameters.iter().fold(template.to_string(), |path, param| {
        let rendered: String = param
            .serialize()
            .into_iter()
            .map(|pair| pair.value)
            .collect();
        path.replace(&format!("{{{}}}", param.name), &rendered)
    })
}
