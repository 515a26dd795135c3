use oapigen_core::parse::{self, Syntax};
use oapigen_core::{CodeGenerator, transform};
use oapigen_go::{GENERATED_HEADER, GoClientGenerator, GoConfig, GoError};

const PETSTORE: &str = include_str!("../../oapigen-core/tests/fixtures/petstore.yaml");
const SWAGGER: &str = include_str!("../../oapigen-core/tests/fixtures/petstore-swagger.json");

fn paths(files: &[oapigen_core::GeneratedFile]) -> Vec<&str> {
    files.iter().map(|f| f.path.as_str()).collect()
}

#[test]
fn petstore_file_layout() {
    let ir = transform::transform(&parse::from_yaml(PETSTORE).unwrap());
    let files = GoClientGenerator
        .generate(&ir, &GoConfig::new("petstore"))
        .unwrap();

    assert_eq!(
        paths(&files),
        vec![
            "doc.go",
            "client.go",
            "utils.go",
            "api_default.go",
            "api_pet.go",
            "model_error.go",
            "model_new_pet.go",
            "model_pet.go",
            "model_pets.go",
        ]
    );
    for file in &files {
        assert!(
            file.content.starts_with(&format!("{GENERATED_HEADER}\n")),
            "{} is missing the generated header",
            file.path
        );
        assert!(file.content.contains("\npackage petstore\n"), "{}", file.path);
    }
}

#[test]
fn petstore_default_service() {
    let ir = transform::transform(&parse::from_yaml(PETSTORE).unwrap());
    let files = GoClientGenerator
        .generate(&ir, &GoConfig::new("petstore"))
        .unwrap();
    let api = files.iter().find(|f| f.path == "api_default.go").unwrap();

    assert!(api.content.contains("func (r *DefaultService) Health() *DefaultHealthCall {\n"));
    assert!(api.content.contains("func (c *DefaultHealthCall) Do(ctx context.Context) (string, error) {\n"));
}

#[test]
fn swagger_document_generates() {
    let spec = parse::parse_document(SWAGGER, Syntax::Json, None).unwrap();
    let ir = transform::transform(&spec);
    let config = GoConfig::for_spec(&ir, None);
    assert_eq!(config.package, "swaggerpetstore");

    let files = GoClientGenerator.generate(&ir, &config).unwrap();
    let paths = paths(&files);
    assert!(paths.contains(&"api_pet.go"));
    assert!(paths.contains(&"api_store.go"));
    assert!(paths.contains(&"model_category.go"));

    let client = files.iter().find(|f| f.path == "client.go").unwrap();
    assert!(client.content.contains("const basePath = \"https://petstore.swagger.io/v2\"\n"));
    assert!(client.content.contains("\tPet *PetService\n"));
    assert!(client.content.contains("\tStore *StoreService\n"));

    let pet = files.iter().find(|f| f.path == "api_pet.go").unwrap();
    assert!(pet.content.contains("\"/pet/\" + url.PathEscape(fmt.Sprint(c.petID)) + \"/uploadImage\""));
    assert!(pet.content.contains("\"multipart/form-data\", c.body"));
}

#[test]
fn invalid_package_is_rejected() {
    let ir = transform::transform(&parse::from_yaml(PETSTORE).unwrap());
    for name in ["Petstore", "pet-store", "type", ""] {
        let err = GoClientGenerator
            .generate(&ir, &GoConfig::new(name))
            .unwrap_err();
        assert!(matches!(err, GoError::InvalidPackage(ref n) if n == name));
    }
}

#[test]
fn generation_is_deterministic() {
    let ir = transform::transform(&parse::from_yaml(PETSTORE).unwrap());
    let config = GoConfig::new("petstore");
    let first = GoClientGenerator.generate(&ir, &config).unwrap();
    let second = GoClientGenerator.generate(&ir, &config).unwrap();
    assert_eq!(first.len(), second.len());
    for (a, b) in first.iter().zip(&second) {
        assert_eq!(a.path, b.path);
        assert_eq!(a.content, b.content);
    }
}

#[test]
fn dropped_schemas_leave_no_dangling_types() {
    let ir = transform::transform(
        &parse::from_yaml(
            r##"
openapi: 3.0.0
info: { title: t, version: "1" }
paths: {}
components:
  schemas:
    Nothing: { type: "null" }
    pet-tag: { type: string }
    pet_tag:
      type: object
      properties:
        a: { type: integer }
    Holder:
      type: object
      properties:
        n: { $ref: "#/components/schemas/Nothing" }
        t: { $ref: "#/components/schemas/pet_tag" }
        label: { type: string }
"##,
        )
        .unwrap(),
    );
    let files = GoClientGenerator
        .generate(&ir, &GoConfig::new("t"))
        .unwrap();
    assert!(paths(&files).ends_with(&["model_holder.go", "model_pet_tag.go"]));

    let holder = files.iter().find(|f| f.path == "model_holder.go").unwrap();
    assert!(holder.content.contains("\tLabel *string `json:\"label,omitempty\"`\n"));
    assert!(!holder.content.contains("Nothing"));
    assert!(!holder.content.contains("json:\"t,omitempty\""));
    assert!(!holder.content.contains("json:\"n,omitempty\""));
}
