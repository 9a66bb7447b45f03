//! Built-in template sets.
//!
//! [`all_template_sets`] is the single entry-point for the templates that
//! ship with railgen: one [`TemplateSet`] per generator component.
//!
//! # Layout
//!
//! | Component  | Rendered under          |
//! |------------|-------------------------|
//! | `backend`  | `<project>/backend`     |
//! | `frontend` | `<project>/frontend`    |
//! | `graphql`  | `<project>` (both apps) |
//! | `docker`   | `<project>`             |
//! | `git`      | `<project>`             |
//!
//! Bodies use `{{VARIABLE}}` placeholders (see `RenderContext`). Files that
//! depend on a feature toggle carry a [`Condition`](railgen_core::domain::Condition);
//! the TypeScript and JavaScript entry points share a slot and are selected by
//! `When`/`Unless`.

use railgen_core::domain::{Component, Feature, TemplateContent, TemplateFile, TemplateSet};

// ── Public API ────────────────────────────────────────────────────────────────

/// Every built-in template set, in step order.
pub fn all_template_sets() -> Vec<TemplateSet> {
    vec![backend(), frontend(), graphql(), docker(), git()]
}

fn param(path: &str, body: &'static str) -> TemplateFile {
    TemplateFile::new(path, TemplateContent::Parameterized(body))
}

fn literal(path: &str, body: &'static str) -> TemplateFile {
    TemplateFile::new(path, TemplateContent::Literal(body))
}

// ── Backend (Rails API) ───────────────────────────────────────────────────────

const RAILS_DIRECTORIES: &[&str] = &[
    "app/controllers",
    "app/models",
    "app/views",
    "app/graphql/types",
    "app/graphql/queries",
    "app/graphql/mutations",
    "app/controllers/concerns",
    "config/initializers",
    "config/environments",
    "db/migrate",
    "lib/tasks",
    "spec/requests",
    "spec/graphql/queries",
    "spec/graphql/mutations",
    "spec/support",
    "spec/requests/api",
    "swagger/v1",
    "sorbet/rbi",
    "bin",
    "log",
    "tmp/pids",
    "tmp/cache",
    "tmp/sockets",
    "storage",
    "public",
];

const RAILS_KEEP_DIRECTORIES: &[&str] =
    &["log", "tmp/pids", "tmp/cache", "tmp/sockets", "storage", "public"];

fn backend() -> TemplateSet {
    TemplateSet::new(Component::Backend)
        .with_base("backend")
        .with_directories(RAILS_DIRECTORIES)
        .with_keep_directories(RAILS_KEEP_DIRECTORIES)
        // core
        .with_file(param("Gemfile", rails::GEMFILE))
        .with_file(literal("Rakefile", rails::RAKEFILE))
        .with_file(literal("config.ru", rails::CONFIG_RU))
        .with_file(literal("config/boot.rb", rails::BOOT))
        .with_file(literal("config/environment.rb", rails::ENVIRONMENT))
        .with_file(param("config/application.rb", rails::APPLICATION))
        .with_file(param("config/database.yml", rails::DATABASE_YML))
        .with_file(param("config/routes.rb", rails::ROUTES))
        .with_file(param("config/application.yml", rails::APPLICATION_YML))
        .with_file(param("config/env.example", rails::ENV_EXAMPLE))
        .with_file(literal("config/initializers/database.rb", rails::DATABASE_INIT))
        .with_file(literal("config/initializers/app_config.rb", rails::APP_CONFIG_INIT))
        .with_file(literal("config/initializers/secrets.rb", rails::SECRETS_INIT))
        .with_file(literal("app/models/application_record.rb", rails::APPLICATION_RECORD))
        .with_file(
            param("app/controllers/application_controller.rb", rails::APPLICATION_CONTROLLER_AUTH)
                .when(Feature::Authentication),
        )
        .with_file(
            param("app/controllers/application_controller.rb", rails::APPLICATION_CONTROLLER)
                .unless(Feature::Authentication),
        )
        .with_file(literal(".gitignore", rails::GITIGNORE))
        .with_file(param("README_DATABASE.md", rails::README_DATABASE))
        // bin
        .with_file(literal("bin/rails", rails::BIN_RAILS).executable())
        .with_file(literal("bin/rake", rails::BIN_RAKE).executable())
        .with_file(param("bin/setup", rails::BIN_SETUP).executable())
        .with_file(literal("bin/bundle", rails::BIN_BUNDLE).executable())
        .with_file(param("bin/setup-database", rails::BIN_SETUP_DATABASE).executable())
        .with_file(param("bin/setup-environment", rails::BIN_SETUP_ENVIRONMENT).executable())
        // type checking is always on
        .with_file(literal("sorbet/config", rails::SORBET_CONFIG))
        .with_file(literal("lib/tasks/sorbet.rake", rails::SORBET_RAKE))
        // authentication
        .with_file(literal("app/models/user.rb", rails::USER_MODEL).when(Feature::Authentication))
        .with_file(
            literal("app/controllers/auth_controller.rb", rails::AUTH_CONTROLLER)
                .when(Feature::Authentication),
        )
        .with_file(
            literal("app/controllers/concerns/jwt_authenticatable.rb", rails::JWT_CONCERN)
                .when(Feature::Authentication),
        )
        .with_file(
            literal("db/migrate/001_create_users.rb", rails::CREATE_USERS)
                .when(Feature::Authentication),
        )
        // API documentation
        .with_file(
            literal("config/initializers/rswag_api.rb", rails::RSWAG_INIT)
                .when(Feature::ApiDocumentation),
        )
        .with_file(param("swagger/v1/swagger.yaml", rails::SWAGGER_YAML).when(Feature::ApiDocumentation))
        .with_file(literal("spec/swagger_helper.rb", rails::SWAGGER_HELPER).when(Feature::ApiDocumentation))
        .with_file(
            literal("spec/requests/api/auth_spec.rb", rails::AUTH_API_SPEC)
                .when(Feature::ApiDocumentation),
        )
        .with_file(literal("lib/tasks/swagger.rake", rails::SWAGGER_RAKE).when(Feature::ApiDocumentation))
        // linting
        .with_file(literal(".rubocop.yml", rails::RUBOCOP_YML).when(Feature::Linting))
        .with_file(literal(".rubocop_graphql.yml", rails::RUBOCOP_GRAPHQL_YML).when(Feature::Linting))
        .with_file(literal("lib/tasks/rubocop.rake", rails::RUBOCOP_RAKE).when(Feature::Linting))
        // testing
        .with_file(literal(".rspec", rails::RSPEC).when(Feature::Testing))
        .with_file(param("spec/spec_helper.rb", rails::SPEC_HELPER).when(Feature::Testing))
        .with_file(literal("spec/support/factory_bot.rb", rails::FACTORY_BOT).when(Feature::Testing))
        .with_file(
            param("spec/support/graphql_test_helpers.rb", rails::GRAPHQL_TEST_HELPERS)
                .when(Feature::Testing),
        )
        .with_file(
            param("spec/requests/application_spec.rb", rails::APPLICATION_SPEC)
                .when(Feature::Testing),
        )
        .with_file(literal("spec/requests/graphql_spec.rb", rails::GRAPHQL_SPEC).when(Feature::Testing))
}

// ── Frontend (React) ──────────────────────────────────────────────────────────

fn frontend() -> TemplateSet {
    TemplateSet::new(Component::Frontend)
        .with_base("frontend")
        .with_directories(&["public", "src/components"])
        .with_keep_directories(&["public"])
        .with_file(param("package.json", react::PACKAGE_JSON))
        .with_file(param("index.html", react::INDEX_HTML))
        .with_file(param("{{BUILD_TOOL}}.config.js", "{{BUILD_TOOL_CONFIG}}"))
        .with_file(param(".env.example", react::ENV_EXAMPLE))
        .with_file(literal("src/App.css", react::APP_CSS))
        .with_file(literal("tsconfig.json", react::TSCONFIG).when(Feature::Typescript))
        .with_file(literal("src/main.tsx", react::MAIN_TSX).when(Feature::Typescript))
        .with_file(literal("src/main.jsx", react::MAIN_JSX).unless(Feature::Typescript))
        .with_file(param("src/App.tsx", react::APP_TSX).when(Feature::Typescript))
        .with_file(param("src/App.jsx", react::APP_JSX).unless(Feature::Typescript))
        .with_file(param("src/App.test.{{JSX_EXT}}", react::APP_TEST).when(Feature::Testing))
        .with_file(literal(".eslintrc.cjs", react::ESLINTRC).when(Feature::Linting))
        .with_file(literal(".prettierrc", react::PRETTIERRC).when(Feature::Linting))
}

// ── GraphQL (server and client) ───────────────────────────────────────────────

fn graphql() -> TemplateSet {
    TemplateSet::new(Component::Graphql)
        .with_file(param("backend/app/graphql/{{APP_NAME}}_schema.rb", graphql::SCHEMA))
        .with_file(literal("backend/app/graphql/types/base_object.rb", graphql::BASE_OBJECT))
        .with_file(literal("backend/app/graphql/types/base_field.rb", graphql::BASE_FIELD))
        .with_file(literal("backend/app/graphql/types/base_argument.rb", graphql::BASE_ARGUMENT))
        .with_file(literal("backend/app/graphql/types/base_input_object.rb", graphql::BASE_INPUT_OBJECT))
        .with_file(literal("backend/app/graphql/types/base_enum.rb", graphql::BASE_ENUM))
        .with_file(literal("backend/app/graphql/types/base_scalar.rb", graphql::BASE_SCALAR))
        .with_file(literal("backend/app/graphql/types/query_type.rb", graphql::QUERY_TYPE))
        .with_file(literal("backend/app/graphql/types/mutation_type.rb", graphql::MUTATION_TYPE))
        .with_file(literal("backend/app/graphql/types/user_type.rb", graphql::USER_TYPE))
        .with_file(literal("backend/app/graphql/queries/base_query.rb", graphql::BASE_QUERY))
        .with_file(literal("backend/app/graphql/queries/users.rb", graphql::USERS_QUERY))
        .with_file(literal("backend/app/graphql/mutations/base_mutation.rb", graphql::BASE_MUTATION))
        .with_file(literal("backend/app/graphql/mutations/create_user.rb", graphql::CREATE_USER))
        .with_file(param("backend/app/controllers/graphql_controller.rb", graphql::CONTROLLER))
        .with_file(param("backend/config/initializers/graphql.rb", graphql::INITIALIZER))
        .with_file(
            literal("backend/spec/graphql/queries/users_spec.rb", graphql::USERS_SPEC)
                .when(Feature::Testing),
        )
        .with_file(
            literal("backend/spec/graphql/mutations/create_user_spec.rb", graphql::CREATE_USER_SPEC)
                .when(Feature::Testing),
        )
        .with_file(literal("frontend/src/graphql/client.{{SCRIPT_EXT}}", graphql::CLIENT))
        .with_file(literal("frontend/src/graphql/queries.{{SCRIPT_EXT}}", graphql::CLIENT_QUERIES))
}

// ── Docker ────────────────────────────────────────────────────────────────────

fn docker() -> TemplateSet {
    TemplateSet::new(Component::Docker)
        .with_file(param("docker-compose.yml", docker::COMPOSE))
        .with_file(literal("docker-compose.override.yml", docker::COMPOSE_OVERRIDE))
        .with_file(param("backend/Dockerfile", docker::BACKEND_DOCKERFILE))
        .with_file(literal("backend/.dockerignore", docker::BACKEND_DOCKERIGNORE))
        .with_file(param("frontend/Dockerfile", docker::FRONTEND_DOCKERFILE))
        .with_file(literal("frontend/.dockerignore", docker::FRONTEND_DOCKERIGNORE))
}

// ── Git ───────────────────────────────────────────────────────────────────────

fn git() -> TemplateSet {
    TemplateSet::new(Component::Git)
        .with_file(literal(".gitignore", git::GITIGNORE))
        .with_file(literal(".gitattributes", git::GITATTRIBUTES))
}

// ── Bodies ────────────────────────────────────────────────────────────────────

mod rails {
    pub const GEMFILE: &str = r#"source "https://rubygems.org"
git_source(:github) { |repo| "https://github.com/#{repo}.git" }

ruby "{{RUBY_VERSION}}"

gem "rails", "~> {{RAILS_VERSION}}"
gem "pg", "~> 1.1"
gem "sqlite3", "~> 1.4"
gem "puma", ">= 5.0"
gem "bootsnap", require: false
gem "rack-cors"
gem "dotenv-rails"

# GraphQL
gem "graphql", "~> 2.1"
gem "graphiql-rails", group: :development

{{AUTHENTICATION_GEMS}}
{{API_DOCS_GEMS}}
{{TYPE_CHECKING_GEMS}}

group :development, :test do
  gem "debug", platforms: %i[ mri mingw x64_mingw ]
  gem "rspec-rails", "~> 6.0"
  gem "factory_bot_rails"
  gem "faker"
{{LINTING_GEMS}}
end
"#;

    pub const RAKEFILE: &str = r#"require_relative "config/application"

Rails.application.load_tasks
"#;

    pub const CONFIG_RU: &str = r#"require_relative "config/environment"

run Rails.application
Rails.application.load_server
"#;

    pub const BOOT: &str = r#"ENV["BUNDLE_GEMFILE"] ||= File.expand_path("../Gemfile", __dir__)

require "bundler/setup"
require "bootsnap/setup"
"#;

    pub const ENVIRONMENT: &str = r#"require_relative "application"

Rails.application.initialize!
"#;

    pub const APPLICATION: &str = r#"require_relative "boot"

require "rails"
require "active_model/railtie"
require "active_record/railtie"
require "action_controller/railtie"

Bundler.require(*Rails.groups)

module {{APP_NAME}}
  class Application < Rails::Application
    config.load_defaults {{RAILS_VERSION}}.to_s[0, 3].to_f
    config.api_only = true

    config.middleware.insert_before 0, Rack::Cors do
      allow do
        origins "http://localhost:{{FRONTEND_PORT}}"
        resource "*", headers: :any, methods: %i[get post put patch delete options head]
      end
    end
  end
end
"#;

    pub const DATABASE_YML: &str = r#"default: &default
  adapter: {{DATABASE_ADAPTER}}
  encoding: unicode
  pool: <%= ENV.fetch("RAILS_MAX_THREADS") { 5 } %>
  host: <%= ENV.fetch("DATABASE_HOST") { "localhost" } %>
  username: <%= ENV.fetch("DATABASE_USERNAME") { "postgres" } %>
  password: <%= ENV.fetch("DATABASE_PASSWORD") { "" } %>

development:
  <<: *default
  database: {{PROJECT_NAME_SNAKE}}_development

test:
  <<: *default
  database: {{PROJECT_NAME_SNAKE}}_test

production:
  <<: *default
  url: <%= ENV["DATABASE_URL"] %>
"#;

    pub const ROUTES: &str = r#"Rails.application.routes.draw do
  # Authentication endpoints
  namespace :auth do
    post :login
    post :register
    get :me
    post :logout
    post :refresh
  end

  # GraphQL endpoint
  post "/graphql", to: "graphql#execute"

  if Rails.env.development?
    get "/graphql", to: redirect("/graphiql")
    mount GraphiQL::Rails::Engine, at: "/graphiql", graphql_path: "/graphql"
  end

  {{API_DOCS_ROUTES}}

  # Health check endpoint
  get "/health", to: proc { [200, {}, ["OK"]] }

  root "application#index"
end
"#;

    pub const APPLICATION_YML: &str = r#"defaults: &defaults
  app_name: "{{APP_NAME}}"
  app_url: "http://localhost:3000"
  frontend_url: "http://localhost:{{FRONTEND_PORT}}"
  database_name: "{{PROJECT_NAME_SNAKE}}"
  graphql_max_complexity: 1000
  jwt_expiration_hours: 24

development:
  <<: *defaults

test:
  <<: *defaults

production:
  <<: *defaults
  app_url: <%= ENV["APP_URL"] %>
"#;

    pub const ENV_EXAMPLE: &str = r#"DATABASE_HOST=localhost
DATABASE_PORT=5432
DATABASE_USERNAME=postgres
DATABASE_PASSWORD=
DATABASE_NAME={{PROJECT_NAME_SNAKE}}_development
JWT_SECRET_KEY=change-me
"#;

    pub const DATABASE_INIT: &str = r#"# Load .env file if it exists
if File.exist?(".env")
  require "dotenv"
  Dotenv.load(".env")
end

Rails.application.config.after_initialize do
  db = Rails.application.config.database_configuration[Rails.env]
  Rails.logger.info "Database: #{db['adapter']} #{db['database']}"
end
"#;

    pub const APP_CONFIG_INIT: &str = r#"require "yaml"

module AppConfig
  class << self
    def method_missing(name, *args, &block)
      config.key?(name.to_s) ? config[name.to_s] : super
    end

    def respond_to_missing?(name, include_private = false)
      config.key?(name.to_s) || super
    end

    def all
      config
    end

    private

    def config
      @config ||= begin
        file = Rails.root.join("config", "application.yml")
        if File.exist?(file)
          yaml = YAML.load(ERB.new(File.read(file)).result, aliases: true)
          yaml[Rails.env] || yaml["defaults"] || {}
        else
          {}
        end
      end
    end
  end
end
"#;

    pub const SECRETS_INIT: &str = r#"module Secrets
  class << self
    def jwt_secret_key
      ENV["JWT_SECRET_KEY"] || Rails.application.credentials.secret_key_base
    end

    def database_url
      ENV["DATABASE_URL"]
    end
  end
end

if Rails.env.production? && Secrets.jwt_secret_key.blank?
  Rails.logger.error "Missing required secret: JWT_SECRET_KEY"
  exit 1
end
"#;

    pub const APPLICATION_RECORD: &str = r#"class ApplicationRecord < ActiveRecord::Base
  primary_abstract_class
end
"#;

    pub const APPLICATION_CONTROLLER_AUTH: &str = r#"class ApplicationController < ActionController::API
  include JwtAuthenticatable

  skip_before_action :authenticate_user!, only: :index

  def index
    render json: {
      message: "Welcome to {{APP_NAME}} API",
      version: "1.0.0",
      endpoints: {
        graphql: "/graphql",
        health: "/health",
        {{API_DOCS_ENDPOINT}}
        graphiql: "/graphiql"
      }
    }
  end
end
"#;

    pub const APPLICATION_CONTROLLER: &str = r#"class ApplicationController < ActionController::API
  def index
    render json: {
      message: "Welcome to {{APP_NAME}} API",
      version: "1.0.0",
      endpoints: {
        graphql: "/graphql",
        health: "/health",
        {{API_DOCS_ENDPOINT}}
        graphiql: "/graphiql"
      }
    }
  end
end
"#;

    pub const GITIGNORE: &str = r#"/.bundle
/log/*
/tmp/*
!/log/.keep
!/tmp/.keep
/storage/*
!/storage/.keep
/config/master.key
/config/credentials/*.key
.env
"#;

    pub const README_DATABASE: &str = r#"# {{APP_NAME}} database

Adapter: `{{DATABASE_ADAPTER}}`

```sh
cp config/env.example .env
bin/setup-database
```
"#;

    pub const BIN_RAILS: &str = r#"#!/usr/bin/env ruby
APP_PATH = File.expand_path("../config/application", __dir__)
require_relative "../config/boot"
require "rails/commands"
"#;

    pub const BIN_RAKE: &str = r#"#!/usr/bin/env ruby
require_relative "../config/boot"
require "rake"
Rake.application.run
"#;

    pub const BIN_SETUP: &str = r#"#!/usr/bin/env ruby
require "fileutils"

APP_ROOT = File.expand_path("..", __dir__)

def system!(*args)
  system(*args, exception: true)
end

FileUtils.chdir APP_ROOT do
  puts "== Installing dependencies for {{APP_NAME}} =="
  system("bundle check") || system!("bundle install")

  puts "\n== Preparing database =="
  system! "bin/rails db:prepare"

  puts "\n== Removing old logs and tempfiles =="
  system! "bin/rails log:clear tmp:clear"
end
"#;

    pub const BIN_BUNDLE: &str = r#"#!/usr/bin/env ruby
require "rubygems"
load Gem.bin_path("bundler", "bundle")
"#;

    pub const BIN_SETUP_DATABASE: &str = r#"#!/usr/bin/env bash
set -euo pipefail

echo "Setting up {{DATABASE_ADAPTER}} database for {{PROJECT_NAME}}"
bin/rails db:create
bin/rails db:migrate
bin/rails db:seed
"#;

    pub const BIN_SETUP_ENVIRONMENT: &str = r#"#!/usr/bin/env bash
set -euo pipefail

if [ ! -f .env ]; then
  cp config/env.example .env
  echo "Created .env from config/env.example"
fi

secret=$(bin/rails secret)
sed -i.bak "s/^JWT_SECRET_KEY=.*/JWT_SECRET_KEY=${secret}/" .env && rm -f .env.bak
echo "Environment ready for {{PROJECT_NAME}}"
"#;

    pub const SORBET_CONFIG: &str = "--dir\n.\n--ignore=tmp/\n--ignore=vendor/\n";

    pub const SORBET_RAKE: &str = r#"namespace :sorbet do
  desc "Type-check the application"
  task :tc do
    sh "bundle exec srb tc"
  end

  desc "Regenerate RBI files"
  task :rbi do
    sh "bundle exec tapioca gems"
    sh "bundle exec tapioca dsl"
  end
end
"#;

    pub const USER_MODEL: &str = r#"# frozen_string_literal: true

class User < ApplicationRecord
  has_secure_password

  validates :email, presence: true, uniqueness: true, format: { with: URI::MailTo::EMAIL_REGEXP }
  validates :name, presence: true, length: { minimum: 2, maximum: 100 }
  validates :password, length: { minimum: 6 }, if: -> { password.present? }

  before_save :downcase_email

  def generate_jwt_token
    JWT.encode(
      { user_id: id, email: email, exp: 24.hours.from_now.to_i },
      Rails.application.credentials.secret_key_base,
      "HS256"
    )
  end

  def as_json(options = {})
    super(options.merge(except: [:password_digest]))
  end

  private

  def downcase_email
    self.email = email.downcase if email.present?
  end
end
"#;

    pub const AUTH_CONTROLLER: &str = r#"# frozen_string_literal: true

class AuthController < ApplicationController
  skip_before_action :authenticate_user!, only: [:login, :register]

  # POST /auth/login
  def login
    user = User.find_by(email: params[:email]&.downcase)

    if user&.authenticate(params[:password])
      render json: { token: user.generate_jwt_token, user: user.as_json }, status: :ok
    else
      render json: { error: "Invalid email or password" }, status: :unauthorized
    end
  end

  # POST /auth/register
  def register
    user = User.new(user_params)

    if user.save
      render json: { token: user.generate_jwt_token, user: user.as_json }, status: :created
    else
      render json: { error: "Registration failed", details: user.errors.full_messages },
             status: :unprocessable_entity
    end
  end

  # GET /auth/me
  def me
    render json: { user: current_user.as_json }, status: :ok
  end

  # POST /auth/logout
  def logout
    render json: { message: "Logout successful" }, status: :ok
  end

  # POST /auth/refresh
  def refresh
    render json: { token: current_user.generate_jwt_token }, status: :ok
  end

  private

  def user_params
    params.require(:user).permit(:email, :name, :password, :password_confirmation)
  end
end
"#;

    pub const JWT_CONCERN: &str = r#"# frozen_string_literal: true

module JwtAuthenticatable
  extend ActiveSupport::Concern

  included do
    before_action :authenticate_user!
  end

  private

  def authenticate_user!
    token = request.headers["Authorization"]&.split(" ")&.last
    decoded = JWT.decode(token, Rails.application.credentials.secret_key_base, true, { algorithm: "HS256" })
    @current_user = User.find(decoded[0]["user_id"])
  rescue ActiveRecord::RecordNotFound
    render json: { error: "User not found" }, status: :unauthorized
  rescue JWT::ExpiredSignature
    render json: { error: "Token expired" }, status: :unauthorized
  rescue JWT::DecodeError
    render json: { error: "Invalid token" }, status: :unauthorized
  end

  def current_user
    @current_user
  end
end
"#;

    pub const CREATE_USERS: &str = r#"class CreateUsers < ActiveRecord::Migration[7.1]
  def change
    create_table :users do |t|
      t.string :email, null: false
      t.string :name, null: false
      t.string :password_digest, null: false

      t.timestamps
    end
    add_index :users, :email, unique: true
  end
end
"#;

    pub const RSWAG_INIT: &str = r#"Rswag::Api.configure do |c|
  c.swagger_root = Rails.root.to_s + "/swagger"
end
"#;

    pub const SWAGGER_YAML: &str = r#"openapi: 3.0.1
info:
  title: {{APP_NAME}} API
  version: v1
paths:
  /auth/login:
    post:
      summary: Log in
      responses:
        "200":
          description: token issued
        "401":
          description: invalid credentials
servers:
  - url: http://localhost:3000
"#;

    pub const SWAGGER_HELPER: &str = r#"require "rails_helper"

RSpec.configure do |config|
  config.swagger_root = Rails.root.join("swagger").to_s
  config.swagger_docs = {
    "v1/swagger.yaml" => {
      openapi: "3.0.1",
      info: { title: "API V1", version: "v1" },
      paths: {}
    }
  }
  config.swagger_format = :yaml
end
"#;

    pub const AUTH_API_SPEC: &str = r#"require "swagger_helper"

RSpec.describe "Auth API", type: :request do
  path "/auth/login" do
    post "Log in" do
      consumes "application/json"
      parameter name: :credentials, in: :body, schema: {
        type: :object,
        properties: { email: { type: :string }, password: { type: :string } },
        required: %w[email password]
      }

      response "401", "invalid credentials" do
        let(:credentials) { { email: "nobody@example.com", password: "wrong" } }
        run_test!
      end
    end
  end
end
"#;

    pub const SWAGGER_RAKE: &str = r#"namespace :swagger do
  desc "Generate swagger/v1/swagger.yaml from request specs"
  task :generate do
    sh "bundle exec rake rswag:specs:swaggerize"
  end
end
"#;

    pub const RUBOCOP_YML: &str = r#"require:
  - rubocop-rails
  - rubocop-rspec

inherit_from: .rubocop_graphql.yml

AllCops:
  NewCops: enable
  Exclude:
    - "bin/**/*"
    - "db/schema.rb"
    - "tmp/**/*"

Style/Documentation:
  Enabled: false
"#;

    pub const RUBOCOP_GRAPHQL_YML: &str = r#"Metrics/MethodLength:
  Exclude:
    - "app/graphql/**/*"

Naming/FileName:
  Exclude:
    - "app/graphql/*_schema.rb"
"#;

    pub const RUBOCOP_RAKE: &str = r#"begin
  require "rubocop/rake_task"
  RuboCop::RakeTask.new(:rubocop)
rescue LoadError
  desc "rubocop is not available"
  task :rubocop do
    abort "rubocop is not installed"
  end
end
"#;

    pub const RSPEC: &str = "--require spec_helper\n--format documentation\n";

    pub const SPEC_HELPER: &str = r#"ENV["RAILS_ENV"] ||= "test"
require_relative "../config/environment"
require "rspec/rails"

Dir[Rails.root.join("spec/support/**/*.rb")].each { |f| require f }

RSpec.configure do |config|
  config.use_transactional_fixtures = true
  config.infer_spec_type_from_file_location!
  config.filter_rails_from_backtrace!
end
"#;

    pub const FACTORY_BOT: &str = r#"RSpec.configure do |config|
  config.include FactoryBot::Syntax::Methods
end
"#;

    pub const GRAPHQL_TEST_HELPERS: &str = r#"module GraphqlTestHelpers
  def execute_graphql(query, variables: {}, context: {})
    {{APP_NAME}}Schema.execute(query, variables: variables, context: context).to_h
  end
end

RSpec.configure do |config|
  config.include GraphqlTestHelpers
end
"#;

    pub const APPLICATION_SPEC: &str = r#"require "spec_helper"

RSpec.describe "Application", type: :request do
  it "describes the {{APP_NAME}} API" do
    get "/"
    expect(response).to have_http_status(:ok)
    expect(response.parsed_body["endpoints"]).to include("graphql" => "/graphql")
  end

  it "reports health" do
    get "/health"
    expect(response.body).to eq("OK")
  end
end
"#;

    pub const GRAPHQL_SPEC: &str = r#"require "spec_helper"

RSpec.describe "GraphQL endpoint", type: :request do
  it "answers the health query" do
    post "/graphql", params: { query: "{ health }" }
    expect(response.parsed_body.dig("data", "health")).to eq("OK")
  end
end
"#;
}

mod react {
    pub const PACKAGE_JSON: &str = r#"{
  "name": "{{PROJECT_NAME}}-frontend",
  "private": true,
  "version": "0.1.0",
  "type": "module",
  "scripts": {
    "dev": "{{BUILD_TOOL_DEV}}",
    "build": "{{BUILD_TOOL_BUILD}}",
    "test": "vitest",
    "lint": "eslint src"
  },
  "dependencies": {
    "@apollo/client": "^3.8.0",
    "graphql": "^16.8.0",
    "react": "^{{REACT_VERSION}}",
    "react-dom": "^{{REACT_VERSION}}"
  },
  "devDependencies": {
    {{BUILD_TOOL_DEPENDENCIES}}
    {{TYPESCRIPT_DEPENDENCIES}}
    {{TESTING_DEPENDENCIES}}
    {{LINTING_DEPENDENCIES}}
    "concurrently": "^8.2.2"
  }
}
"#;

    pub const INDEX_HTML: &str = r#"<!doctype html>
<html lang="en">
  <head>
    <meta charset="UTF-8" />
    <meta name="viewport" content="width=device-width, initial-scale=1.0" />
    <title>{{APP_NAME}}</title>
  </head>
  <body>
    <div id="root"></div>
    <script type="module" src="/src/main.{{JSX_EXT}}"></script>
  </body>
</html>
"#;

    pub const ENV_EXAMPLE: &str = "VITE_GRAPHQL_URL=http://localhost:3000/graphql\n";

    pub const APP_CSS: &str = r#"#root {
  max-width: 960px;
  margin: 0 auto;
  padding: 2rem;
  font-family: system-ui, sans-serif;
}
"#;

    pub const TSCONFIG: &str = r#"{
  "compilerOptions": {
    "target": "ES2020",
    "lib": ["ES2020", "DOM", "DOM.Iterable"],
    "module": "ESNext",
    "moduleResolution": "bundler",
    "jsx": "react-jsx",
    "strict": true,
    "skipLibCheck": true,
    "noEmit": true
  },
  "include": ["src"]
}
"#;

    pub const MAIN_TSX: &str = r#"import React from 'react'
import ReactDOM from 'react-dom/client'
import { ApolloProvider } from '@apollo/client'
import { client } from './graphql/client'
import App from './App'
import './App.css'

ReactDOM.createRoot(document.getElementById('root')!).render(
  <React.StrictMode>
    <ApolloProvider client={client}>
      <App />
    </ApolloProvider>
  </React.StrictMode>,
)
"#;

    pub const MAIN_JSX: &str = r#"import React from 'react'
import ReactDOM from 'react-dom/client'
import { ApolloProvider } from '@apollo/client'
import { client } from './graphql/client'
import App from './App'
import './App.css'

ReactDOM.createRoot(document.getElementById('root')).render(
  <React.StrictMode>
    <ApolloProvider client={client}>
      <App />
    </ApolloProvider>
  </React.StrictMode>,
)
"#;

    pub const APP_TSX: &str = r#"import { useQuery } from '@apollo/client'
import { HEALTH } from './graphql/queries'

function App(): JSX.Element {
  const { data, loading, error } = useQuery<{ health: string }>(HEALTH)

  return (
    <main>
      <h1>{{APP_NAME}}</h1>
      <p>
        API status: {loading ? 'checking…' : error ? 'unreachable' : data?.health}
      </p>
    </main>
  )
}

export default App
"#;

    pub const APP_JSX: &str = r#"import { useQuery } from '@apollo/client'
import { HEALTH } from './graphql/queries'

function App() {
  const { data, loading, error } = useQuery(HEALTH)

  return (
    <main>
      <h1>{{APP_NAME}}</h1>
      <p>
        API status: {loading ? 'checking…' : error ? 'unreachable' : data?.health}
      </p>
    </main>
  )
}

export default App
"#;

    pub const APP_TEST: &str = r#"import { render, screen } from '@testing-library/react'
import { MockedProvider } from '@apollo/client/testing'
import { describe, expect, it } from 'vitest'
import App from './App'

describe('App', () => {
  it('renders the application name', () => {
    render(
      <MockedProvider mocks={[]}>
        <App />
      </MockedProvider>,
    )
    expect(screen.getByText('{{APP_NAME}}')).toBeDefined()
  })
})
"#;

    pub const ESLINTRC: &str = r#"module.exports = {
  root: true,
  env: { browser: true, es2020: true },
  extends: ['eslint:recommended', 'plugin:react/recommended', 'plugin:react-hooks/recommended'],
  settings: { react: { version: 'detect' } },
  rules: { 'react/react-in-jsx-scope': 'off' },
}
"#;

    pub const PRETTIERRC: &str = "{\n  \"semi\": false,\n  \"singleQuote\": true,\n  \"trailingComma\": \"all\"\n}\n";
}

mod graphql {
    pub const SCHEMA: &str = r##"class {{APP_NAME}}Schema < GraphQL::Schema
  mutation(Types::MutationType)
  query(Types::QueryType)

  rescue_from(ActiveRecord::RecordNotFound) do |err, obj, args, ctx, field|
    raise GraphQL::ExecutionError.new("#{field.type.unwrap.graphql_name} not found", extensions: { code: "NOT_FOUND" })
  end

  rescue_from(ActiveRecord::RecordInvalid) do |err, obj, args, ctx, field|
    raise GraphQL::ExecutionError.new(err.record.errors.full_messages.join(", "), extensions: { code: "VALIDATION_ERROR" })
  end

  def self.unauthorized_object(error)
    Rails.logger.warn("GraphQL Unauthorized: #{error.message}")
    raise GraphQL::ExecutionError.new("Unauthorized", extensions: { code: "UNAUTHORIZED" })
  end
end
"##;

    pub const BASE_OBJECT: &str = r#"module Types
  class BaseObject < GraphQL::Schema::Object
    field_class Types::BaseField
  end
end
"#;

    pub const BASE_FIELD: &str = r#"module Types
  class BaseField < GraphQL::Schema::Field
    argument_class Types::BaseArgument
  end
end
"#;

    pub const BASE_ARGUMENT: &str = r#"module Types
  class BaseArgument < GraphQL::Schema::Argument
  end
end
"#;

    pub const BASE_INPUT_OBJECT: &str = r#"module Types
  class BaseInputObject < GraphQL::Schema::InputObject
    argument_class Types::BaseArgument
  end
end
"#;

    pub const BASE_ENUM: &str = r#"module Types
  class BaseEnum < GraphQL::Schema::Enum
  end
end
"#;

    pub const BASE_SCALAR: &str = r#"module Types
  class BaseScalar < GraphQL::Schema::Scalar
  end
end
"#;

    pub const QUERY_TYPE: &str = r#"module Types
  class QueryType < Types::BaseObject
    field :health, String, null: false,
      description: "Health check endpoint for the API"

    def health
      "OK"
    end

    field :users, resolver: Queries::Users,
      description: "Get all users"
  end
end
"#;

    pub const MUTATION_TYPE: &str = r#"module Types
  class MutationType < Types::BaseObject
    field :create_user, mutation: Mutations::CreateUser,
      description: "Create a new user"
  end
end
"#;

    pub const USER_TYPE: &str = r#"module Types
  class UserType < Types::BaseObject
    field :id, ID, null: false
    field :email, String, null: false
    field :name, String, null: true
    field :created_at, GraphQL::Types::ISO8601DateTime, null: false
  end
end
"#;

    pub const BASE_QUERY: &str = r#"module Queries
  class BaseQuery < GraphQL::Schema::Resolver
  end
end
"#;

    pub const USERS_QUERY: &str = r#"module Queries
  class Users < Queries::BaseQuery
    type [Types::UserType], null: false
    description "Get all users"

    def resolve
      []
    end
  end
end
"#;

    pub const BASE_MUTATION: &str = r#"module Mutations
  class BaseMutation < GraphQL::Schema::RelayClassicMutation
    argument_class Types::BaseArgument
    field_class Types::BaseField
    object_class Types::BaseObject
  end
end
"#;

    pub const CREATE_USER: &str = r#"module Mutations
  class CreateUser < Mutations::BaseMutation
    argument :email, String, required: true
    argument :name, String, required: false
    argument :password, String, required: true

    field :user, Types::UserType, null: true
    field :errors, [String], null: false

    def resolve(email:, password:, name: nil)
      { user: nil, errors: ["User creation not implemented yet"] }
    end
  end
end
"#;

    pub const CONTROLLER: &str = r#"class GraphqlController < ApplicationController
  def execute
    result = {{APP_NAME}}Schema.execute(
      params[:query],
      variables: prepare_variables(params[:variables]),
      context: {},
      operation_name: params[:operationName]
    )
    render json: result
  end

  private

  def prepare_variables(variables_param)
    case variables_param
    when String then variables_param.present? ? JSON.parse(variables_param) : {}
    when Hash then variables_param
    when ActionController::Parameters then variables_param.to_unsafe_hash
    when nil then {}
    else raise ArgumentError, "Unexpected parameter: #{variables_param}"
    end
  end
end
"#;

    pub const INITIALIZER: &str = r#"Rails.application.config.after_initialize do
  {{APP_NAME}}Schema.max_complexity = 1000
  {{APP_NAME}}Schema.max_depth = 20
end
"#;

    pub const USERS_SPEC: &str = r#"require "spec_helper"

RSpec.describe Queries::Users do
  it "returns a list" do
    result = execute_graphql("{ users { id email } }")
    expect(result.dig("data", "users")).to eq([])
  end
end
"#;

    pub const CREATE_USER_SPEC: &str = r#"require "spec_helper"

RSpec.describe Mutations::CreateUser do
  it "reports that creation is not implemented" do
    query = <<~GQL
      mutation { createUser(input: { email: "a@b.c", password: "secret1" }) { errors } }
    GQL
    result = execute_graphql(query)
    expect(result.dig("data", "createUser", "errors")).not_to be_empty
  end
end
"#;

    pub const CLIENT: &str = r#"import { ApolloClient, InMemoryCache, HttpLink } from '@apollo/client'

export const client = new ApolloClient({
  link: new HttpLink({ uri: import.meta.env.VITE_GRAPHQL_URL ?? 'http://localhost:3000/graphql' }),
  cache: new InMemoryCache(),
})
"#;

    pub const CLIENT_QUERIES: &str = r#"import { gql } from '@apollo/client'

export const HEALTH = gql`
  query Health {
    health
  }
`

export const USERS = gql`
  query Users {
    users {
      id
      email
      name
    }
  }
`
"#;
}

mod docker {
    pub const COMPOSE: &str = r#"services:
  db:
    image: postgres:16
    environment:
      POSTGRES_PASSWORD: postgres
      POSTGRES_DB: {{PROJECT_NAME_SNAKE}}_development
    volumes:
      - db-data:/var/lib/postgresql/data

  backend:
    build: ./backend
    command: bundle exec rails server -b 0.0.0.0
    environment:
      DATABASE_HOST: db
      DATABASE_USERNAME: postgres
      DATABASE_PASSWORD: postgres
    ports:
      - "3000:3000"
    depends_on:
      - db

  frontend:
    build: ./frontend
    environment:
      VITE_GRAPHQL_URL: http://localhost:3000/graphql
    ports:
      - "{{FRONTEND_PORT}}:{{FRONTEND_PORT}}"
    depends_on:
      - backend

volumes:
  db-data:
"#;

    pub const COMPOSE_OVERRIDE: &str = r#"services:
  backend:
    volumes:
      - ./backend:/app
  frontend:
    volumes:
      - ./frontend:/app
      - /app/node_modules
"#;

    pub const BACKEND_DOCKERFILE: &str = r#"FROM ruby:{{RUBY_VERSION}}-slim

RUN apt-get update -qq && apt-get install -y build-essential libpq-dev libsqlite3-dev

WORKDIR /app
COPY Gemfile Gemfile.lock* ./
RUN bundle install
COPY . .

EXPOSE 3000
CMD ["bundle", "exec", "rails", "server", "-b", "0.0.0.0"]
"#;

    pub const BACKEND_DOCKERIGNORE: &str = "log/*\ntmp/*\nstorage/*\n.env\n";

    pub const FRONTEND_DOCKERFILE: &str = r#"FROM node:20-alpine

RUN corepack enable
WORKDIR /app
COPY package.json ./
RUN {{PACKAGE_MANAGER}} install
COPY . .

EXPOSE {{FRONTEND_PORT}}
CMD ["{{PACKAGE_MANAGER}}", "run", "dev", "--", "--host", "0.0.0.0"]
"#;

    pub const FRONTEND_DOCKERIGNORE: &str = "node_modules\ndist\n.env\n";
}

mod git {
    pub const GITIGNORE: &str = r#"# Dependencies
node_modules/
/backend/vendor/bundle

# Environment
.env
.env.local

# Build output
/frontend/dist

# Logs and temp files
*.log
/backend/tmp/*
!/backend/tmp/.keep

# Editors
.idea/
.vscode/
.DS_Store
"#;

    pub const GITATTRIBUTES: &str = "* text=auto\n*.rb diff=ruby\nGemfile.lock linguist-generated\n";
}

#[cfg(test)]
mod tests {
    use super::*;
    use railgen_core::domain::Features;

    #[test]
    fn every_builtin_set_is_valid() {
        for set in all_template_sets() {
            set.validate()
                .unwrap_or_else(|e| panic!("{} is invalid: {e}", set.component));
        }
    }

    #[test]
    fn sets_follow_component_order() {
        let components: Vec<Component> = all_template_sets().iter().map(|s| s.component).collect();
        assert_eq!(components, Component::ALL);
    }

    #[test]
    fn auth_files_are_gated() {
        let set = backend();
        let off = Features {
            authentication: false,
            ..Features::default()
        };
        let defaults = Features::default();
        let with: Vec<&str> = set
            .files_for(&defaults)
            .map(|f| f.path.as_str())
            .collect();
        let without: Vec<&str> = set.files_for(&off).map(|f| f.path.as_str()).collect();

        assert!(with.contains(&"app/models/user.rb"));
        assert!(!without.contains(&"app/models/user.rb"));
        // exactly one application controller either way
        let count = |paths: &[&str]| {
            paths
                .iter()
                .filter(|p| **p == "app/controllers/application_controller.rb")
                .count()
        };
        assert_eq!(count(&with), 1);
        assert_eq!(count(&without), 1);
    }

    #[test]
    fn bin_scripts_are_executable() {
        let set = backend();
        let bins: Vec<_> = set
            .files
            .iter()
            .filter(|f| f.path.as_str().starts_with("bin/"))
            .collect();
        assert_eq!(bins.len(), 6);
        assert!(bins.iter().all(|f| f.permissions.is_executable()));
    }
}
