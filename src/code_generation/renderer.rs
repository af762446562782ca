use anyhow::{Context, Result};
use askama::Template;
use heck::ToPascalCase;

use crate::code_generation::dispatcher::{ComponentRequest, FileKind, SchemaKind};

#[derive(Template)]
#[template(
    ext = "txt",
    source = r#"import { Controller, Get } from "@mayajs/common";
{% if with_service %}import { {{ class_name }}Service } from "./{{ file_stem }}.service";
{% endif %}
@Controller({
  route: "/{{ file_stem }}",
})
export class {{ class_name }}Controller {
  constructor({% if with_service %}private service: {{ class_name }}Service{% endif %}) {}

  @Get({ path: "/", middlewares: [] })
  get(req: any, res: any, next: any) {
    res.send("{{ class_name }} is working");
  }
}
"#
)]
struct ControllerTemplate<'a> {
    class_name: &'a str,
    file_stem: &'a str,
    with_service: bool,
}

#[derive(Template)]
#[template(
    ext = "txt",
    source = r#"import { Injectable } from "@mayajs/common";

@Injectable()
export class {{ class_name }}Service {
  hello() {
    return "Hello from {{ class_name }}Service";
  }
}
"#
)]
struct ServiceTemplate<'a> {
    class_name: &'a str,
}

#[derive(Template)]
#[template(
    ext = "txt",
    source = r#"{% if mongo %}import { Schema, model } from "mongoose";

const {{ class_name }}Schema = new Schema({
  name: { type: String, required: true },
}, { timestamps: true });

export default model("{{ class_name }}", {{ class_name }}Schema);
{% else %}import { Column, Entity, PrimaryGeneratedColumn } from "typeorm";

@Entity({ name: "{{ file_stem }}" })
export class {{ class_name }} {
  @PrimaryGeneratedColumn()
  id!: number;

  @Column()
  name!: string;
}
{% endif %}"#
)]
struct ModelTemplate<'a> {
    class_name: &'a str,
    file_stem: &'a str,
    mongo: bool,
}

/// `user-profile` -> `UserProfile`
pub fn class_name(name: &str) -> String {
    name.to_pascal_case()
}

/// Source text of one generated file
pub fn render(file: FileKind, request: &ComponentRequest) -> Result<String> {
    let class_name = class_name(&request.name);
    let file_stem = request.name.as_str();

    let rendered = match file {
        FileKind::Controller => ControllerTemplate {
            class_name: &class_name,
            file_stem,
            with_service: request.imports_service(),
        }
        .render(),
        FileKind::Service => ServiceTemplate { class_name: &class_name }.render(),
        FileKind::Model => ModelTemplate {
            class_name: &class_name,
            file_stem,
            mongo: request.schema != Some(SchemaKind::Sql),
        }
        .render(),
    };

    rendered.with_context(|| format!("Failed to render {} for {}", file.suffix(), request.name))
}
