use nu_plugin::{EngineInterface, EvaluatedCall, PluginCommand};
use nu_protocol::{
    Category, Example, LabeledError, PipelineData, Signature, SyntaxShape, Type, Value,
};

use super::util::{from_json, input_rows, seed_flag, tables_flag};
use crate::ops;
use crate::SegmentsPlugin;

pub struct Positioning;

impl PluginCommand for Positioning {
    type Plugin = SegmentsPlugin;

    fn name(&self) -> &str {
        "segments positioning"
    }

    fn description(&self) -> &str {
        "Rank a laboratory against four competitors within a segment, with market shares summing to 100"
    }

    fn signature(&self) -> Signature {
        Signature::build(self.name())
            .input_output_types(vec![
                (Type::Nothing, Type::record()),
                (Type::table(), Type::Any),
            ])
            .required("lab", SyntaxShape::String, "Laboratory to position")
            .named(
                "segment-type",
                SyntaxShape::String,
                "Segment type: universe, category, family (default: category)",
                Some('s'),
            )
            .named(
                "segment",
                SyntaxShape::String,
                "Segment name. If omitted with table input, the lab's top segment is used",
                None,
            )
            .switch(
                "enrich",
                "Enrich table input before finding the top segment",
                Some('e'),
            )
            .named(
                "taxonomy",
                SyntaxShape::String,
                "Path to taxonomy JSON file (default: embedded pharmacy taxonomy)",
                Some('t'),
            )
            .named(
                "seed",
                SyntaxShape::Int,
                "Random seed for reproducible shares",
                None,
            )
            .category(Category::Experimental)
    }

    fn search_terms(&self) -> Vec<&str> {
        vec!["positioning", "market share", "competitors", "rank"]
    }

    fn examples(&self) -> Vec<Example<'_>> {
        vec![
            Example {
                example: "segments positioning Acme --segment-type family --segment Antalgiques",
                description: "Position a lab within a family",
                result: None,
            },
            Example {
                example: "open products.json | segments positioning Sanofi --segment-type category --enrich",
                description: "Position a lab within its largest category",
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
        let lab: String = call.req(0)?;
        let segment_type: String = call
            .get_flag::<String>("segment-type")?
            .unwrap_or_else(|| "category".into());
        let segment: Option<String> = call.get_flag("segment")?;
        let enrich = call.has_flag("enrich")?;
        let tables = tables_flag(call.get_flag("taxonomy")?)?;
        let seed = seed_flag(call.get_flag::<i64>("seed")?);
        let head = call.head;

        let result = match segment {
            Some(segment) => ops::op_positioning(&lab, &segment_type, &segment, &tables, seed),
            None => {
                let rows = input_rows(input);
                if rows.is_empty() {
                    return Err(LabeledError::new("Missing segment")
                        .with_label("pass --segment or pipe in the lab's products", head));
                }
                ops::op_position_top_segment(&rows, &lab, &segment_type, enrich, &tables, seed)
            }
        }
        .map_err(LabeledError::new)?;

        if result.is_null() {
            return Ok(PipelineData::Value(Value::nothing(head), None));
        }
        Ok(PipelineData::Value(from_json(&result, head), None))
    }
}
