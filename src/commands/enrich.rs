use nu_plugin::{EngineInterface, EvaluatedCall, PluginCommand};
use nu_protocol::{Category, Example, LabeledError, PipelineData, Signature, SyntaxShape, Type};

use super::util::{from_json, input_rows, seed_flag, tables_flag};
use crate::ops;
use crate::SegmentsPlugin;

pub struct Enrich;

impl PluginCommand for Enrich {
    type Plugin = SegmentsPlugin;

    fn name(&self) -> &str {
        "segments enrich"
    }

    fn description(&self) -> &str {
        "Fill in universe, category, family and range for every product"
    }

    fn signature(&self) -> Signature {
        Signature::build(self.name())
            .input_output_type(Type::table(), Type::table())
            .named(
                "taxonomy",
                SyntaxShape::String,
                "Path to taxonomy JSON file (default: embedded pharmacy taxonomy)",
                Some('t'),
            )
            .named(
                "seed",
                SyntaxShape::Int,
                "Random seed for reproducible enrichment",
                None,
            )
            .category(Category::Experimental)
    }

    fn search_terms(&self) -> Vec<&str> {
        vec!["enrich", "taxonomy", "classify", "category", "universe", "family", "range"]
    }

    fn examples(&self) -> Vec<Example<'_>> {
        vec![
            Example {
                example: r#"[[id name laboratory sales price]; [1 "Doliprane 1000" Sanofi 120 "2.18"]] | segments enrich --seed 42"#,
                description: "Assign a taxonomy to a product without a category",
                result: None,
            },
            Example {
                example: "open products.json | segments enrich --taxonomy my-taxonomy.json",
                description: "Enrich against a custom taxonomy",
                result: None,
            },
        ]
    }

    fn run(
        &self,
        _plugin: &SegmentsPlugin,
        _engine: &EngineInterface,
        call: &EvaluatedCall,
        input: PipelineData,
    ) -> Result<PipelineData, LabeledError> {
        let tables = tables_flag(call.get_flag("taxonomy")?)?;
        let seed = seed_flag(call.get_flag::<i64>("seed")?);
        let head = call.head;

        let rows = input_rows(input);
        let result = ops::op_enrich(&rows, &tables, seed).map_err(LabeledError::new)?;

        Ok(PipelineData::Value(from_json(&result, head), None))
    }
}
