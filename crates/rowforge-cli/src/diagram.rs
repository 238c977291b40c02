use rowforge_schema::DiagramData;

/// Render diagram data as mermaid `erDiagram` text.
pub fn render_mermaid(data: &DiagramData) -> String {
    let mut out = String::from("erDiagram\n");

    for entity in &data.entities {
        out.push_str(&format!("    {} {{\n", identifier(&entity.name)));
        for attribute in &entity.attributes {
            let marker = if attribute.unique_id { " PK" } else { "" };
            out.push_str(&format!(
                "        {} {}{}\n",
                identifier(&attribute.data_type),
                identifier(&attribute.name),
                marker
            ));
        }
        out.push_str("    }\n");
    }

    for relation in &data.relations {
        out.push_str(&format!(
            "    {} }}o--|| {} : \"{}: {}\"\n",
            identifier(&relation.from_entity),
            identifier(&relation.to_entity),
            relation.relationship,
            relation.label
        ));
    }

    out
}

fn identifier(value: &str) -> String {
    let cleaned: String = value
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '_' { c } else { '_' })
        .collect();
    if cleaned.is_empty() {
        "_".to_string()
    } else {
        cleaned
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rowforge_schema::{DiagramAttribute, DiagramEntity, DiagramRelation};

    #[test]
    fn renders_entities_and_relations() {
        let data = DiagramData {
            entities: vec![DiagramEntity {
                id: "user".to_string(),
                name: "User".to_string(),
                attributes: vec![DiagramAttribute {
                    name: "id".to_string(),
                    data_type: "int".to_string(),
                    unique_id: true,
                }],
            }],
            relations: vec![DiagramRelation {
                relationship: "role_user".to_string(),
                from_entity: "role".to_string(),
                to_entity: "user".to_string(),
                label: "user_id -> id".to_string(),
            }],
        };

        let rendered = render_mermaid(&data);
        assert!(rendered.starts_with("erDiagram"));
        assert!(rendered.contains("User {"));
        assert!(rendered.contains("int id PK"));
        assert!(rendered.contains("role }o--|| user"));
    }
}
